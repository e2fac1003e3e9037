//! Overlay rendering: layout, text metrics, display lists and the compositor

pub mod compositor;
pub mod layout;
pub mod overlay;
pub mod text;

pub use compositor::{Compositor, FrameContext};
pub use layout::{FeedbackLayout, MarkerLayout, OverlayLayout, ScoreboardLayout, ShotInfoLayout};
pub use overlay::{DrawCommand, Overlay};
pub use text::{wrap_text, HersheyMetrics, TextMeasure};
