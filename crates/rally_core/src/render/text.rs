//! Text measurement and word wrapping

/// Pixel size of rendered text; backends with a real font provide exact numbers.
pub trait TextMeasure {
    /// `(width, height)` of `text` at `scale` and stroke `thickness`.
    fn text_size(&self, text: &str, scale: f64, thickness: i32) -> (i32, i32);

    fn text_width(&self, text: &str, scale: f64, thickness: i32) -> i32 {
        self.text_size(text, scale, thickness).0
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_size(&self, text: &str, scale: f64, thickness: i32) -> (i32, i32) {
        (**self).text_size(text, scale, thickness)
    }
}

/// Approximate metrics of the Hershey simplex stroke font at scale 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct HersheyMetrics;

impl HersheyMetrics {
    const CAP_HEIGHT: f64 = 22.0;

    fn advance(c: char) -> f64 {
        match c {
            ' ' => 16.0,
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 8.0,
            'f' | 't' | 'r' | 'I' | '-' | '(' | ')' => 12.0,
            'm' | 'w' | 'M' | 'W' | '@' => 26.0,
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => 21.0,
            _ => 19.0,
        }
    }
}

impl TextMeasure for HersheyMetrics {
    fn text_size(&self, text: &str, scale: f64, thickness: i32) -> (i32, i32) {
        let advance: f64 = text.chars().map(Self::advance).sum();
        let width = (advance * scale).round() as i32 + thickness.max(0);
        let height = (Self::CAP_HEIGHT * scale).round() as i32 + thickness.max(0);
        (width, height)
    }
}

/// Greedy word wrap to `max_width` pixels.
///
/// A word wider than `max_width` on its own still gets a line of its own.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    measure: &M,
    scale: f64,
    thickness: i32,
    max_width: i32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current.join(" "), word)
        };

        if measure.text_width(&candidate, scale, thickness) <= max_width {
            current.push(word);
        } else {
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}
