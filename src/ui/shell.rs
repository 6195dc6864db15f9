// src/ui/shell.rs
use std::io::{self, Write};
use std::pin::pin;

use colored::Colorize;
use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::{
    services::{
        transport::Transport,
        widget::{ChatWidget, Submission},
    },
    state::ChatState,
    ui::terminal::TerminalView,
};

const TITLE: &str = "Me-Lo AI";
const DESCRIPTION: &str =
    "Me-Lo AI: Your AI-powered medical assistant. Powered by Llama 3 model and a medical data.";
const FOOTER: &str = "© LongevAI";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    ToggleTheme,
    Quit,
    Send(String),
}

pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "/theme" => Command::ToggleTheme,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Send(line.to_string()),
    }
}

/// Branding chrome around a single chat widget.
pub struct Shell<T, W: Write> {
    widget: ChatWidget<T, TerminalView<W>>,
}

impl<T: Transport, W: Write> Shell<T, W> {
    pub fn new(transport: T, out: W, theme: Theme) -> io::Result<Self> {
        let mut view = TerminalView::new(out, theme);
        write_header(view.writer(), theme)?;
        let widget = ChatWidget::with_state(ChatState::new(), transport, view);
        Ok(Self { widget })
    }

    pub fn widget(&self) -> &ChatWidget<T, TerminalView<W>> {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut ChatWidget<T, TerminalView<W>> {
        &mut self.widget
    }

    pub fn theme(&self) -> Theme {
        self.widget.viewport().theme()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme().toggled();
        self.widget.viewport_mut().set_theme(theme);
        info!(?theme, "theme switched");
        theme
    }

    /// Read lines until EOF, `/quit` or Ctrl-C at the prompt. Ctrl-C while a
    /// response is pending cancels that response instead.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let interrupts = stream::unfold((), |()| async {
            tokio::signal::ctrl_c().await.ok().map(|()| ((), ()))
        });
        self.run_until(input, interrupts).await
    }

    /// Like [`Shell::run`], with interrupts taken from `interrupts`.
    pub async fn run_until<R, I>(&mut self, input: R, interrupts: I) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        I: Stream<Item = ()>,
    {
        let mut lines = input.lines();
        let mut interrupts = pin!(interrupts);
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                Some(()) = interrupts.next() => {
                    info!("interrupted at prompt");
                    break;
                }
            };
            let Some(line) = line else { break };

            match parse_command(&line) {
                Command::Quit => break,
                Command::ToggleTheme => {
                    let theme = self.toggle_theme();
                    writeln!(self.out(), "\n[{theme:?} mode]")?;
                }
                Command::Send(text) => {
                    self.widget.set_input(text);
                    let outcome = tokio::select! {
                        submission = self.widget.submit() => Some(submission),
                        Some(()) = interrupts.next() => None,
                    };
                    match outcome {
                        Some(submission) => self.report(&submission)?,
                        None => {
                            if self.widget.cancel() {
                                writeln!(self.out(), "{}", "[cancelled]".dimmed())?;
                            }
                        }
                    }
                }
            }
        }
        self.finish()
    }

    fn report(&mut self, submission: &Submission) -> io::Result<()> {
        if !matches!(submission, Submission::Failed(_)) {
            return Ok(());
        }
        if let Some(error) = self.widget.state().error().map(str::to_string) {
            writeln!(self.out(), "{}", error.red())?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        let out = self.out();
        writeln!(out)?;
        writeln!(out, "{}", FOOTER.dimmed())?;
        out.flush()
    }

    fn out(&mut self) -> &mut W {
        self.widget.viewport_mut().writer()
    }
}

fn write_header<W: Write>(out: &mut W, theme: Theme) -> io::Result<()> {
    let title = match theme {
        Theme::Dark => TITLE.bright_white().bold(),
        Theme::Light => TITLE.black().bold(),
    };
    writeln!(out, "{title}")?;
    writeln!(out, "{}", DESCRIPTION.italic())?;
    writeln!(out, "{}", "Type a question, /theme to switch colours, /quit to leave.".dimmed())?;
    writeln!(out)
}
