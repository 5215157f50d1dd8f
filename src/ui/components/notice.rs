use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A one-line message surfaced to the user, the terminal stand-in for a
/// toast. Errors from the backend land here verbatim; the screen stays
/// interactive and the user retries manually.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, area: Rect, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };

    let style = match notice.kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red),
    };

    let bar = Paragraph::new(notice.text.as_str()).style(style);
    frame.render_widget(bar, area);
}
