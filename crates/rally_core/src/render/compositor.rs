//! Frame Compositor
//!
//! Pure function from (frame number, score state, timeline, marker) to the
//! overlay for that frame. Paint order: player marker, scoreboard, shot
//! info, feedback caption.

use super::layout::OverlayLayout;
use super::overlay::Overlay;
use super::text::{wrap_text, TextMeasure};
use crate::animation::{FlashAnimation, FlashStyle, Rgb};
use crate::pose::PixelPoint;
use crate::score::ScoreState;
use crate::timeline::Timeline;

/// Per-frame inputs to [`Compositor::render_frame`].
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub frame_number: u64,
    pub state: &'a ScoreState,
    pub timeline: &'a Timeline,
    pub marker: Option<PixelPoint>,
    /// Seconds since the last applied event, if any.
    pub elapsed: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Compositor<M> {
    pub layout: OverlayLayout,
    pub animation: FlashAnimation,
    pub flash: FlashStyle,
    pub marker_label: String,
    /// Extra frames the shot description stays up after its event.
    pub shot_info_hold_frames: u64,
    pub width: u32,
    pub height: u32,
    measure: M,
}

impl<M: TextMeasure> Compositor<M> {
    pub fn new(width: u32, height: u32, measure: M) -> Self {
        Self {
            layout: OverlayLayout::default(),
            animation: FlashAnimation::default(),
            flash: FlashStyle::default(),
            marker_label: String::new(),
            shot_info_hold_frames: 0,
            width,
            height,
            measure,
        }
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    pub fn render_frame(&self, ctx: &FrameContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();

        if let Some(head) = ctx.marker {
            self.draw_marker(&mut overlay, head);
        }
        self.draw_scoreboard(&mut overlay, ctx);

        if let Some(event) = ctx.timeline.recent_event(ctx.frame_number, self.shot_info_hold_frames) {
            self.draw_shot_info(&mut overlay, &event.shot_descriptor);
        }
        if let Some(feedback) = ctx.timeline.feedback_at(ctx.frame_number) {
            self.draw_feedback(&mut overlay, feedback);
        }

        overlay
    }

    fn draw_marker(&self, overlay: &mut Overlay, head: PixelPoint) {
        let m = &self.layout.marker;
        let tip_y = (head.y - m.lift).max(0);

        // Downward-pointing triangle above the head.
        overlay.polygon(
            vec![
                PixelPoint::new(head.x, tip_y + m.arrow_height),
                PixelPoint::new(head.x - m.arrow_width / 2, tip_y),
                PixelPoint::new(head.x + m.arrow_width / 2, tip_y),
            ],
            m.arrow_color,
        );

        if self.marker_label.is_empty() {
            return;
        }
        let label_width = self.measure.text_width(&self.marker_label, m.label_scale, m.label_thickness);
        overlay.outlined_text(
            &self.marker_label,
            PixelPoint::new(head.x - label_width / 2, tip_y - m.label_gap),
            m.label_scale,
            Rgb::WHITE,
            m.label_thickness,
            m.label_outline,
        );
    }

    fn draw_scoreboard(&self, overlay: &mut Overlay, ctx: &FrameContext<'_>) {
        let s = &self.layout.scoreboard;
        let [team1_color, team2_color] = self.animation.score_colors(ctx.state, ctx.elapsed, self.flash);

        overlay.outlined_text(
            &format!("Team 1: {}", ctx.state.team1_score),
            PixelPoint::new(s.x, s.y),
            s.scale,
            team1_color,
            s.thickness,
            s.outline,
        );
        overlay.outlined_text(
            &format!("Team 2: {}", ctx.state.team2_score),
            PixelPoint::new(s.x, s.y + s.spacing),
            s.scale,
            team2_color,
            s.thickness,
            s.outline,
        );
        overlay.outlined_text(
            &format!("Serving: Team {}", ctx.state.serving_team.number()),
            PixelPoint::new(s.x, s.y + s.spacing * 2),
            s.scale * s.serving_scale_factor,
            s.serving_color,
            s.thickness,
            s.outline,
        );
    }

    fn draw_shot_info(&self, overlay: &mut Overlay, descriptor: &str) {
        let s = &self.layout.shot_info;
        overlay.outlined_text(
            descriptor,
            PixelPoint::new(self.width as i32 - s.right_offset, s.y),
            s.scale,
            Rgb::WHITE,
            s.thickness,
            s.outline,
        );
    }

    fn draw_feedback(&self, overlay: &mut Overlay, feedback: &str) {
        let f = &self.layout.feedback;
        let max_width = (self.width as f64 * f.max_width_ratio) as i32;
        let lines = wrap_text(feedback, &self.measure, f.scale, f.thickness, max_width);

        let total_height = lines.len() as i32 * f.line_spacing;
        let start_y = self.height as i32 - f.bottom_margin - total_height;

        for (i, line) in lines.iter().enumerate() {
            let width = self.measure.text_width(line, f.scale, f.thickness);
            let x = (self.width as i32 - width) / 2;
            let y = start_y + i as i32 * f.line_spacing;

            overlay.text(
                line,
                PixelPoint::new(x + f.shadow_offset, y + f.shadow_offset),
                f.scale,
                Rgb::BLACK,
                f.thickness,
            );
            overlay.text(line, PixelPoint::new(x, y), f.scale, Rgb::WHITE, f.thickness);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::overlay::DrawCommand;
    use crate::render::text::HersheyMetrics;
    use crate::timeline::{build_timeline, CurrentRecord, PointWinner, RawEvent, FOREGROUND_TEAM};

    fn timeline(feedback: Option<&str>) -> Timeline {
        build_timeline(
            &[RawEvent::Current(CurrentRecord {
                timestamp_of_outcome: "0:01".to_string(),
                shot_by_player: "Ana".to_string(),
                shot_type: "Erne".to_string(),
                point_winner: FOREGROUND_TEAM.to_string(),
                current_score: "1-0".to_string(),
                feedback: feedback.map(str::to_string),
            })],
            10,
        )
        .unwrap()
    }

    fn compositor() -> Compositor<HersheyMetrics> {
        let mut c = Compositor::new(1920, 1080, HersheyMetrics);
        c.marker_label = "Pedro".to_string();
        c
    }

    #[test]
    fn test_scoreboard_always_drawn() {
        let timeline = timeline(None);
        let state = ScoreState::new();
        let overlay = compositor().render_frame(&FrameContext {
            frame_number: 0,
            state: &state,
            timeline: &timeline,
            marker: None,
            elapsed: None,
        });

        let texts: Vec<&str> = overlay.texts().collect();
        assert_eq!(
            texts,
            vec!["Team 1: 0", "Team 1: 0", "Team 2: 0", "Team 2: 0", "Serving: Team 1", "Serving: Team 1"]
        );
        assert_eq!(overlay.text_color("Serving: Team 1"), Some(Rgb::YELLOW));
    }

    #[test]
    fn test_winner_line_flashes() {
        let timeline = timeline(None);
        let state = ScoreState {
            team1_score: 1,
            last_event_owner: Some(PointWinner::Foreground),
            ..ScoreState::new()
        };
        let overlay = compositor().render_frame(&FrameContext {
            frame_number: 10,
            state: &state,
            timeline: &timeline,
            marker: None,
            elapsed: Some(0.75),
        });

        assert_eq!(overlay.text_color("Team 1: 1"), Some(Rgb::GREEN));
        assert_eq!(overlay.text_color("Team 2: 0"), Some(Rgb::WHITE));
    }

    #[test]
    fn test_shot_info_only_on_event_frame() {
        let timeline = timeline(None);
        let state = ScoreState::new();
        let render = |frame| {
            compositor().render_frame(&FrameContext {
                frame_number: frame,
                state: &state,
                timeline: &timeline,
                marker: None,
                elapsed: None,
            })
        };

        assert!(render(10).texts().any(|t| t == "Ana - Erne"));
        assert!(!render(11).texts().any(|t| t == "Ana - Erne"));

        let mut held = compositor();
        held.shot_info_hold_frames = 5;
        let overlay = held.render_frame(&FrameContext {
            frame_number: 15,
            state: &state,
            timeline: &timeline,
            marker: None,
            elapsed: None,
        });
        assert!(overlay.texts().any(|t| t == "Ana - Erne"));
    }

    #[test]
    fn test_feedback_centered_with_shadow() {
        let timeline = timeline(Some("Move your feet"));
        let state = ScoreState::new();
        let c = compositor();
        let overlay = c.render_frame(&FrameContext {
            frame_number: 12,
            state: &state,
            timeline: &timeline,
            marker: None,
            elapsed: None,
        });

        let feedback: Vec<&DrawCommand> = overlay
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Text { text, .. } if text == "Move your feet"))
            .collect();
        assert_eq!(feedback.len(), 2);

        let width = c.measure().text_width("Move your feet", 1.2, 3);
        match (feedback[0], feedback[1]) {
            (
                DrawCommand::Text { origin: shadow, color: Rgb::BLACK, .. },
                DrawCommand::Text { origin: main, color: Rgb::WHITE, .. },
            ) => {
                assert_eq!(main.x, (1920 - width) / 2);
                assert_eq!(main.y, 1080 - 120 - 45);
                assert_eq!((shadow.x, shadow.y), (main.x + 2, main.y + 2));
            }
            other => panic!("unexpected feedback commands {other:?}"),
        }
    }

    #[test]
    fn test_marker_arrow_geometry() {
        let timeline = timeline(None);
        let state = ScoreState::new();
        let overlay = compositor().render_frame(&FrameContext {
            frame_number: 0,
            state: &state,
            timeline: &timeline,
            marker: Some(PixelPoint::new(500, 60)),
            elapsed: None,
        });

        match &overlay.commands[0] {
            DrawCommand::Polygon { points, color } => {
                assert_eq!(*color, Rgb::RED);
                // Tip row clamps to the top edge: max(0, 60 - 110) = 0.
                assert_eq!(
                    points,
                    &vec![PixelPoint::new(500, 30), PixelPoint::new(478, 0), PixelPoint::new(522, 0)]
                );
            }
            other => panic!("expected arrow first, got {other:?}"),
        }
        assert!(overlay.texts().any(|t| t == "Pedro"));
    }
}
