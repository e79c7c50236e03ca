use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Section,
}

/// Enables or disables ANSI colouring for the rest of the process.
pub fn set_color_enabled(enabled: bool) {
    if enabled {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => format!("WARNING: {text}").bright_yellow().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}
