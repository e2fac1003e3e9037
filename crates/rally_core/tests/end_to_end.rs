use rally_core::animation::ClockSource;
use rally_core::render::HersheyMetrics;
use rally_core::timeline::Side;
use rally_core::{
    build_timeline, Canvas, Compositor, EventLog, FrameContext, FrameSource, NoPose, Overlay,
    PipelineDriver, Preview, PreviewControl, RenderSettings, Result, ScoreState, VideoInfo,
};
use serde_json::json;
use std::thread;
use std::time::{Duration, Instant};

const FPS: u32 = 10;

fn event_log() -> EventLog {
    EventLog::from_value(json!({
        "shots": [
            {
                "timestamp_of_outcome": "0:01",
                "shot_by_player": "Ana",
                "shot_type": "Third shot drop",
                "point_winner": "Far Side Team",
                "current_score": "Side Out"
            },
            {
                "timestamp_of_outcome": "0:02",
                "shot_by_player": "Pedro",
                "shot_type": "Overhead",
                "point_winner": "Foreground Team",
                "current_score": "2-1-1",
                "feedback": "Great reset, then finish high"
            }
        ]
    }))
    .unwrap()
}

#[test]
fn side_out_then_snapshot_over_frames_0_to_25() {
    let timeline = build_timeline(&event_log().records, FPS).unwrap();
    assert_eq!(timeline.events()[0].frame_number, 10);
    assert_eq!(timeline.events()[1].frame_number, 20);

    let mut state = ScoreState::new();
    for frame in 0..=25u64 {
        let (next, _) = state.advance(&timeline, frame, Instant::now());
        state = next;

        let expected_serve = if frame >= 10 { Side::Team2 } else { Side::Team1 };
        let expected_score = if frame >= 20 { (2, 1) } else { (0, 0) };
        assert_eq!(state.serving_team, expected_serve, "serve at frame {frame}");
        assert_eq!((state.team1_score, state.team2_score), expected_score, "score at frame {frame}");
    }
}

#[test]
fn compositor_text_follows_state() {
    let timeline = build_timeline(&event_log().records, FPS).unwrap();
    let compositor = Compositor::new(1920, 1080, HersheyMetrics);

    let mut state = ScoreState::new();
    let mut overlays = Vec::new();
    for frame in 0..=25u64 {
        let now = Instant::now();
        state = state.advance(&timeline, frame, now).0;
        overlays.push(compositor.render_frame(&FrameContext {
            frame_number: frame,
            state: &state,
            timeline: &timeline,
            marker: None,
            elapsed: None,
        }));
    }

    let has = |frame: usize, text: &str| overlays[frame].texts().any(|t| t == text);
    assert!(has(9, "Serving: Team 1"));
    assert!(has(10, "Serving: Team 2"));
    assert!(has(19, "Team 1: 0"));
    assert!(has(20, "Team 1: 2") && has(20, "Team 2: 1"));
    assert!(has(25, "Team 1: 2") && has(25, "Serving: Team 2"));
    assert!(has(20, "Pedro - Overhead"));
    assert!(has(25, "Great reset, then finish high"));
    assert!(!has(19, "Great reset, then finish high"));
}

struct Blank {
    remaining: u64,
}

impl FrameSource for Blank {
    type Frame = Option<Overlay>;

    fn info(&self) -> VideoInfo {
        VideoInfo { fps: FPS as f64, width: 1920, height: 1080, frame_count: None }
    }

    fn read_frame(&mut self) -> Result<Option<Self::Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(None))
    }
}

struct Keep;

impl Canvas<Option<Overlay>> for Keep {
    fn draw(&mut self, frame: &mut Option<Overlay>, overlay: &Overlay) -> Result<()> {
        *frame = Some(overlay.clone());
        Ok(())
    }
}

#[test]
fn pipeline_flashes_winner_on_video_clock() {
    let timeline = build_timeline(&event_log().records, FPS).unwrap();
    let settings = RenderSettings { clock: ClockSource::Video, ..RenderSettings::default() };
    let driver = PipelineDriver::new(&timeline, &settings, HersheyMetrics);

    let run = driver
        .run(&mut Blank { remaining: 60 }, &mut Blank { remaining: 60 }, &mut NoPose, &mut Keep, None)
        .unwrap();
    assert_eq!(run.frames.len(), 60);
    assert_eq!(run.report.events_applied, 2);
    assert_eq!(run.report.final_score.serving_team, 2);

    // Frame n is stored at index n - 1. The point lands on frame 20; half the
    // 1.5s flash later (frame 27 at 10 fps = 0.7s, frame 28 = 0.8s) Team 1 is green-ish.
    let color = |frame: usize, text: &str| run.frames[frame - 1].as_ref().unwrap().text_color(text);
    assert_eq!(color(20, "Team 1: 2"), Some(rally_core::Rgb::WHITE));
    let peak = color(27, "Team 1: 2").unwrap();
    assert_eq!(peak.1, 255);
    assert!(peak.0 < 40 && peak.2 < 40);
    assert_eq!(color(27, "Team 2: 1"), Some(rally_core::Rgb::WHITE));
    assert_eq!(color(35, "Team 1: 2"), Some(rally_core::Rgb::WHITE));
}

/// Holds the loop on one frame, as a slow preview window would.
struct PauseAfter {
    frame: usize,
    pause: Duration,
    shown: usize,
}

impl Preview<Option<Overlay>> for PauseAfter {
    fn show(&mut self, _frame: &Option<Overlay>) -> Result<PreviewControl> {
        self.shown += 1;
        if self.shown == self.frame {
            thread::sleep(self.pause);
        }
        Ok(PreviewControl::Continue)
    }
}

#[test]
fn pipeline_flash_follows_wall_clock_by_default() {
    let timeline = build_timeline(&event_log().records, FPS).unwrap();
    let settings = RenderSettings::default();
    assert_eq!(settings.clock, ClockSource::Wall);
    let driver = PipelineDriver::new(&timeline, &settings, HersheyMetrics);

    // 0.75s of real time passes between frame 20 (the point) and frame 21.
    let mut preview = PauseAfter { frame: 20, pause: Duration::from_millis(750), shown: 0 };
    let run = driver
        .run(
            &mut Blank { remaining: 25 },
            &mut Blank { remaining: 25 },
            &mut NoPose,
            &mut Keep,
            Some(&mut preview),
        )
        .unwrap();
    assert_eq!(run.report.events_applied, 2);

    let color = |frame: usize, text: &str| run.frames[frame - 1].as_ref().unwrap().text_color(text);
    let at_point = color(20, "Team 1: 2").unwrap();
    assert!(at_point.0 > 200, "flash starts near white, got {at_point:?}");

    // On the video clock frame 21 would be 0.1s in and still pale.
    let after_pause = color(21, "Team 1: 2").unwrap();
    assert_eq!(after_pause.1, 255);
    assert!(after_pause.0 < 100 && after_pause.2 < 100, "expected near green, got {after_pause:?}");
    assert_eq!(color(21, "Team 2: 1"), Some(rally_core::Rgb::WHITE));
}

#[test]
fn shared_frame_shows_the_event_that_was_applied() {
    let log = EventLog::from_value(json!({
        "shots": [
            {
                "timestamp_of_outcome": "0:01",
                "shot_by_player": "Ana",
                "shot_type": "Drive",
                "point_winner": "Foreground Team",
                "current_score": "1-0"
            },
            {
                "timestamp_of_outcome": "0:01",
                "shot_by_player": "Bo",
                "shot_type": "Lob",
                "point_winner": "Far Side Team",
                "current_score": "0-1"
            }
        ]
    }))
    .unwrap();
    let timeline = build_timeline(&log.records, FPS).unwrap();
    let settings = RenderSettings { clock: ClockSource::Video, ..RenderSettings::default() };
    let driver = PipelineDriver::new(&timeline, &settings, HersheyMetrics);

    let run = driver
        .run(&mut Blank { remaining: 15 }, &mut Blank { remaining: 15 }, &mut NoPose, &mut Keep, None)
        .unwrap();
    assert_eq!(run.report.events_applied, 1);
    assert_eq!((run.report.final_score.team1_score, run.report.final_score.team2_score), (1, 0));

    let frame10 = run.frames[9].as_ref().unwrap();
    assert!(frame10.texts().any(|t| t == "Team 1: 1"));
    assert!(frame10.texts().any(|t| t == "Ana - Drive"));
    assert!(!frame10.texts().any(|t| t == "Bo - Lob"));
}

#[test]
fn out_of_range_timestamp_is_kept_but_never_fires() {
    let log = EventLog::from_value(json!({
        "shots": [
            {
                "timestamp_of_outcome": "99999999999999999999:00",
                "shot_by_player": "Ana",
                "shot_type": "Drive",
                "point_winner": "Foreground Team",
                "current_score": "9-0",
                "feedback": "Never shown"
            },
            {
                "timestamp_of_outcome": "0:01",
                "shot_by_player": "Bo",
                "shot_type": "Lob",
                "point_winner": "Far Side Team",
                "current_score": "0-1"
            }
        ]
    }))
    .unwrap();
    let timeline = build_timeline(&log.records, FPS).unwrap();
    assert_eq!(timeline.len(), 2);

    let settings = RenderSettings { clock: ClockSource::Video, ..RenderSettings::default() };
    let driver = PipelineDriver::new(&timeline, &settings, HersheyMetrics);
    let run = driver
        .run(&mut Blank { remaining: 40 }, &mut Blank { remaining: 40 }, &mut NoPose, &mut Keep, None)
        .unwrap();

    assert_eq!(run.report.events_applied, 1);
    assert_eq!((run.report.final_score.team1_score, run.report.final_score.team2_score), (0, 1));
    assert!(run
        .frames
        .iter()
        .flatten()
        .all(|o| !o.texts().any(|t| t == "Never shown" || t == "Ana - Drive")));
}
