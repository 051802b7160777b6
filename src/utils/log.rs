// src/utils/log.rs

//! Terminal readout for a scrape session.
//!
//! Used by the presentation side (progress lines, session summary). Library
//! diagnostics go through the `log` facade instead.

use std::sync::OnceLock;

use chrono::Local;

/// Minimum level a console line needs to be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

static THRESHOLD: OnceLock<LogLevel> = OnceLock::new();

/// Set the console threshold from a filter name (`debug`, `info`, ...).
/// Only the first call has an effect.
pub fn init(level: &str) {
    let _ = THRESHOLD.set(LogLevel::parse(level));
}

fn enabled(level: LogLevel) -> bool {
    level >= THRESHOLD.get().copied().unwrap_or(LogLevel::Info)
}

fn line(tag: &str, message: &str) -> String {
    format!("[{}] [{}] {}", Local::now().format("%H:%M:%S"), tag, message)
}

fn emit(level: LogLevel, tag: &str, message: &str) {
    if !enabled(level) {
        return;
    }
    if level >= LogLevel::Warn {
        eprintln!("{}", line(tag, message));
    } else {
        println!("{}", line(tag, message));
    }
}

/// Extra detail shown with `--verbose`.
pub fn debug(message: &str) {
    emit(LogLevel::Debug, LogLevel::Debug.tag(), message);
}

pub fn info(message: &str) {
    emit(LogLevel::Info, LogLevel::Info.tag(), message);
}

pub fn warn(message: &str) {
    emit(LogLevel::Warn, LogLevel::Warn.tag(), message);
}

pub fn error(message: &str) {
    emit(LogLevel::Error, LogLevel::Error.tag(), message);
}

/// Running record count after an extraction pass.
pub fn progress(message: &str) {
    emit(LogLevel::Info, "PROG", message);
}

/// End-of-session line. Printed regardless of threshold.
pub fn success(message: &str) {
    println!("{}", line("DONE", &format!("✓ {}", message)));
}

pub fn header(title: &str) {
    let rule = "─".repeat(48);
    for text in [rule.as_str(), title, rule.as_str()] {
        emit(LogLevel::Info, LogLevel::Info.tag(), text);
    }
}

/// Key/value block printed after a session ends.
pub fn summary(title: &str, items: &[(&str, String)]) {
    emit(LogLevel::Info, "SUMMARY", title);
    let width = items.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in items {
        emit(
            LogLevel::Info,
            "SUMMARY",
            &format!("  {key:<width$}  {value}"),
        );
    }
}
