// src/ui/terminal.rs
use std::io::{self, Write};

use colored::Colorize;
use tracing::warn;

use crate::{
    message::{Message, Sender},
    services::widget::Viewport,
    ui::shell::Theme,
};

/// Bottom-anchored transcript: new messages and appended text are written
/// as they arrive, so the newest content is always the last thing printed.
pub struct TerminalView<W: Write> {
    out: W,
    theme: Theme,
    /// Messages whose rendering has started.
    shown: usize,
    /// Bytes of the last shown message already written.
    tail: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, theme: Theme) -> Self {
        Self { out, theme, shown: 0, tail: 0 }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn label(&self, sender: Sender) -> String {
        let (user, bot) = match self.theme {
            Theme::Dark => ("You".bright_cyan(), "Me-Lo AI".bright_green()),
            Theme::Light => ("You".blue(), "Me-Lo AI".magenta()),
        };
        match sender {
            Sender::User => user.bold().to_string(),
            Sender::Bot => bot.bold().to_string(),
        }
    }

    fn render(&mut self, messages: &[Message]) -> io::Result<()> {
        if messages.len() < self.shown {
            // Rolled back: close the abandoned line.
            writeln!(self.out)?;
            self.shown = messages.len();
            self.tail = messages.last().map_or(0, |m| m.text.len());
            return self.out.flush();
        }

        if self.shown > 0 {
            let last = &messages[self.shown - 1];
            if let Some(delta) = last.text.get(self.tail..) {
                write!(self.out, "{delta}")?;
            }
        }

        for message in &messages[self.shown..] {
            if self.shown > 0 {
                writeln!(self.out)?;
            }
            let label = self.label(message.sender);
            write!(self.out, "{label}: {}", message.text)?;
            self.shown += 1;
        }

        self.tail = messages.last().map_or(0, |m| m.text.len());
        self.out.flush()
    }
}

impl<W: Write> Viewport for TerminalView<W> {
    fn scroll_to_bottom(&mut self, messages: &[Message]) {
        if let Err(err) = self.render(messages) {
            warn!(error = %err, "failed to render transcript");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(steps: &[Vec<Message>]) -> String {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new(), Theme::Dark);
        for messages in steps {
            view.scroll_to_bottom(messages);
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn prints_appended_text_as_delta() {
        let out = render_all(&[
            vec![Message::bot("Hi")],
            vec![Message::bot("Hi"), Message::user("cough"), Message::bot("")],
            vec![Message::bot("Hi"), Message::user("cough"), Message::bot("How")],
            vec![Message::bot("Hi"), Message::user("cough"), Message::bot("How long?")],
        ]);
        assert_eq!(out, "Me-Lo AI: Hi\nYou: cough\nMe-Lo AI: How long?");
    }

    #[test]
    fn rollback_closes_partial_line() {
        let out = render_all(&[
            vec![Message::user("q"), Message::bot("par")],
            vec![Message::user("q")],
            vec![Message::user("q"), Message::user("again")],
        ]);
        assert_eq!(out, "You: q\nMe-Lo AI: par\n\nYou: again");
    }
}
