//! Display list handed to a drawing backend

use crate::animation::Rgb;
use crate::pose::PixelPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Anti-aliased text; `origin` is the bottom-left of the baseline.
    Text {
        text: String,
        origin: PixelPoint,
        scale: f64,
        color: Rgb,
        thickness: i32,
    },
    /// Filled polygon.
    Polygon { points: Vec<PixelPoint>, color: Rgb },
}

/// Everything drawn on one frame, in paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub commands: Vec<DrawCommand>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn text(&mut self, text: &str, origin: PixelPoint, scale: f64, color: Rgb, thickness: i32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            scale,
            color,
            thickness,
        });
    }

    /// Text over a thicker black copy of itself.
    pub fn outlined_text(
        &mut self,
        text: &str,
        origin: PixelPoint,
        scale: f64,
        color: Rgb,
        thickness: i32,
        outline: i32,
    ) {
        self.text(text, origin, scale, Rgb::BLACK, outline);
        self.text(text, origin, scale, color, thickness);
    }

    pub fn polygon(&mut self, points: Vec<PixelPoint>, color: Rgb) {
        self.commands.push(DrawCommand::Polygon { points, color });
    }

    /// Strings of every text command, in paint order (outlines included).
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Polygon { .. } => None,
        })
    }

    /// Color of the last text command drawing exactly `text`.
    pub fn text_color(&self, text: &str) -> Option<Rgb> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::Text { text: t, color, .. } if t == text => Some(*color),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlined_text_paints_outline_first() {
        let mut overlay = Overlay::new();
        overlay.outlined_text("Team 1: 0", PixelPoint::new(30, 150), 2.1, Rgb::GREEN, 6, 12);

        assert_eq!(overlay.commands.len(), 2);
        match &overlay.commands[0] {
            DrawCommand::Text { color, thickness, .. } => {
                assert_eq!(*color, Rgb::BLACK);
                assert_eq!(*thickness, 12);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(overlay.text_color("Team 1: 0"), Some(Rgb::GREEN));
    }

    #[test]
    fn test_serialized_shape() {
        let mut overlay = Overlay::new();
        overlay.polygon(vec![PixelPoint::new(1, 2)], Rgb::RED);
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["commands"][0]["kind"], "polygon");
        assert_eq!(json["commands"][0]["color"], serde_json::json!([255, 0, 0]));
    }
}
