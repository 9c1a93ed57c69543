//! ANSI-aware text measurement and padding.
//!
//! Escape codes are preserved in output but don't count toward display width.

use console::{measure_text_width, pad_str, Alignment};

use crate::directive::Align;

/// Returns the display width of a string, ignoring ANSI escape codes.
///
/// CJK characters count as two columns.
pub fn display_width(s: &str) -> usize {
    measure_text_width(s)
}

/// Pads a string on the left (right-aligns) to reach the target width.
pub fn pad_left(s: &str, width: usize) -> String {
    pad_str(s, width, Alignment::Right, None).into_owned()
}

/// Pads a string on the right (left-aligns) to reach the target width.
pub fn pad_right(s: &str, width: usize) -> String {
    pad_str(s, width, Alignment::Left, None).into_owned()
}

/// Pads a string on both sides (centers) to reach the target width.
///
/// When the remaining space is odd, the extra space goes on the right.
pub fn pad_center(s: &str, width: usize) -> String {
    pad_str(s, width, Alignment::Center, None).into_owned()
}

/// Pads according to a column alignment.
pub fn pad_aligned(s: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => pad_right(s, width),
        Align::Right => pad_left(s, width),
        Align::Center => pad_center(s, width),
    }
}

/// Renders a footnote mark as superscript digits (`12` → `¹²`).
pub fn superscript(mark: usize) -> String {
    mark.to_string()
        .chars()
        .map(|c| match c {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        })
        .collect()
}
