// src/ui/mod.rs
pub mod shell;
pub mod terminal;

pub use shell::{Shell, Theme};
pub use terminal::TerminalView;
