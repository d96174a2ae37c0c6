//! Paints a [`HudFrame`] onto a fixed terminal row band.
//!
//! The HUD occupies three rows: a header with the speaker and navigation
//! affordances, the message body, and a key-hint line. Opacity maps onto
//! ANSI color steps since a terminal cell has no alpha channel.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::event::MessageKind;
use crate::runtime::HudFrame;

/// Rows the HUD band occupies, starting at `top`.
pub const HUD_ROWS: u16 = 3;

/// Map an opacity in `[0, 1]` to a foreground color step.
#[must_use]
pub fn opacity_color(opacity: f64) -> Color {
    if opacity >= 0.85 {
        Color::White
    } else if opacity >= 0.55 {
        Color::Grey
    } else {
        Color::DarkGrey
    }
}

/// Truncate to `width` display characters, marking the cut with `…`.
#[must_use]
pub fn truncate_line(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Label for a navigation affordance; disabled arrows render hollow.
#[must_use]
pub const fn nav_label(prev: bool, enabled: bool) -> &'static str {
    match (prev, enabled) {
        (true, true) => "[<]",
        (true, false) => "[ ]",
        (false, true) => "[>]",
        (false, false) => "[ ]",
    }
}

/// The body line with kind-dependent plain-text styling applied.
#[must_use]
pub fn styled_body(kind: MessageKind, body: &str) -> String {
    match kind {
        MessageKind::Ic => format!("\"{body}\""),
        MessageKind::Emote => format!("* {body}"),
        MessageKind::Ooc | MessageKind::Roll | MessageKind::Other => body.to_string(),
    }
}

/// Paint the frame onto the band starting at `top`. A hidden frame
/// clears the band instead.
pub fn paint(out: &mut impl Write, frame: &HudFrame, cols: u16, top: u16) -> io::Result<()> {
    for row in 0..HUD_ROWS {
        queue!(out, MoveTo(0, top + row), Clear(ClearType::CurrentLine))?;
    }

    if !frame.visible {
        out.flush()?;
        return Ok(());
    }
    let Some(content) = &frame.content else {
        out.flush()?;
        return Ok(());
    };

    let width = cols as usize;
    let color = opacity_color(frame.opacity);

    let header = format!(
        "{} {}  {}{}",
        nav_label(true, frame.prev_enabled),
        nav_label(false, frame.next_enabled),
        content.speaker,
        if frame.entrance_pending { " ~" } else { "" },
    );
    queue!(
        out,
        MoveTo(0, top),
        SetForegroundColor(color),
        SetAttribute(Attribute::Bold),
    )?;
    write!(out, "{}", truncate_line(&header, width))?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    let body = styled_body(content.kind, &content.body);
    queue!(out, MoveTo(2, top + 1), SetForegroundColor(color))?;
    write!(out, "{}", truncate_line(&body, width.saturating_sub(2)))?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    queue!(out, MoveTo(0, top + 2), SetForegroundColor(Color::DarkGrey))?;
    write!(
        out,
        "{}",
        truncate_line("←/→ navigate · del delete · r refresh · q quit", width)
    )?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RenderedContent;

    fn frame(body: &str) -> HudFrame {
        HudFrame {
            visible: true,
            event_id: Some("msg-1".to_string()),
            content: Some(RenderedContent {
                speaker: "Alice".to_string(),
                kind: MessageKind::Ooc,
                body: body.to_string(),
                roll: None,
            }),
            opacity: 1.0,
            entrance_pending: false,
            prev_enabled: true,
            next_enabled: false,
        }
    }

    #[test]
    fn opacity_steps() {
        assert_eq!(opacity_color(1.0), Color::White);
        assert_eq!(opacity_color(0.85), Color::White);
        assert_eq!(opacity_color(0.6), Color::Grey);
        assert_eq!(opacity_color(0.35), Color::DarkGrey);
        assert_eq!(opacity_color(0.0), Color::DarkGrey);
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate_line("hello", 10), "hello");
        assert_eq!(truncate_line("hello world", 8), "hello w…");
        assert_eq!(truncate_line("hello", 0), "");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_line("héllo wörld", 8), "héllo w…");
    }

    #[test]
    fn nav_labels_reflect_enablement() {
        assert_eq!(nav_label(true, true), "[<]");
        assert_eq!(nav_label(true, false), "[ ]");
        assert_eq!(nav_label(false, true), "[>]");
    }

    #[test]
    fn body_styling_by_kind() {
        assert_eq!(styled_body(MessageKind::Ooc, "hi"), "hi");
        assert_eq!(styled_body(MessageKind::Ic, "well met"), "\"well met\"");
        assert_eq!(styled_body(MessageKind::Emote, "waves"), "* waves");
        assert_eq!(styled_body(MessageKind::Roll, "Roll: 7 (2d6)"), "Roll: 7 (2d6)");
    }

    #[test]
    fn paint_writes_header_and_body() {
        let mut buffer = Vec::new();
        paint(&mut buffer, &frame("hello there"), 80, 0).unwrap();
        let text = String::from_utf8_lossy(&buffer);
        assert!(text.contains("Alice"));
        assert!(text.contains("hello there"));
        assert!(text.contains("[<]"));
    }

    #[test]
    fn paint_hidden_frame_only_clears() {
        let mut buffer = Vec::new();
        paint(&mut buffer, &HudFrame::hidden(), 80, 0).unwrap();
        let text = String::from_utf8_lossy(&buffer);
        assert!(!text.contains("Alice"));
    }
}
