//! Terminal colors for human-readable listings
//!
//! Applies ANSI escape codes to status labels using crossterm.

use crossterm::style::{Color, Stylize};
use skillmap::TreeStatus;

/// Label for a tree's publication state
///
/// Published trees are green, drafts yellow.
pub fn status_label(status: TreeStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    let tint = match status {
        TreeStatus::Published => Color::Green,
        TreeStatus::Draft => Color::Yellow,
    };
    format!("{}", text.with(tint))
}

/// Check or cross mark for a validation line
pub fn mark(ok: bool, color: bool) -> String {
    let (glyph, tint) = if ok {
        ("✓", Color::Green)
    } else {
        ("✗", Color::Red)
    };
    if color {
        format!("{}", glyph.with(tint))
    } else {
        glyph.to_string()
    }
}
