//! Terminal view - draws menus and outcomes with crossterm colours.
//! Everything writes to a caller-supplied `Write` so it can be captured.

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

use crate::constants::{APP_NAME, APP_VERSION, SLOW_MS, VERY_SLOW_MS};
use crate::messages::ui_events::{KEY_CLEAR, KEY_HELP, KEY_QUIT, KEY_RELOAD};
use crate::messages::{Feedback, MenuEntry};
use crate::models::{ContentKind, ResolvedCall};

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        _ => Color::Red,
    }
}

/// Elapsed-time color
pub fn elapsed_color(ms: u64) -> Color {
    if ms >= VERY_SLOW_MS {
        Color::Red
    } else if ms >= SLOW_MS {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        "HEAD" | "OPTIONS" => Color::Magenta,
        _ => Color::White,
    }
}

/// Wipe the screen so the menu is redrawn in place
pub fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    out.flush()
}

pub fn draw_banner(out: &mut impl Write, namespace: &str, mode: &str, live_reload: bool) -> io::Result<()> {
    writeln!(
        out,
        "{} {}  namespace {}  mode {}{}",
        APP_NAME.bold(),
        APP_VERSION.dark_grey(),
        namespace.cyan(),
        mode.cyan(),
        if live_reload { "  (live reload)" } else { "" }
    )
}

pub fn draw_namespaces(out: &mut impl Write, namespaces: &[String]) -> io::Result<()> {
    writeln!(out, "Namespaces:")?;
    for (i, name) in namespaces.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", i + 1, name)?;
    }
    Ok(())
}

pub fn draw_menu(out: &mut impl Write, entries: &[MenuEntry]) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "{}", "No requests available in this mode".yellow())?;
    }
    let name_width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(
            out,
            "  {:>2}. {:<name_width$}  {} /{}",
            entry.index,
            entry.name,
            format!("{:<7}", entry.method).with(method_color(&entry.method)),
            entry.path.as_str().dark_grey(),
            name_width = name_width,
        )?;
    }
    writeln!(
        out,
        "{}",
        format!("  [{}]eload  [{}]lear responses  [{}]elp  [{}]uit", KEY_RELOAD, KEY_CLEAR, KEY_HELP, KEY_QUIT).dark_grey()
    )
}

pub fn draw_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        r#"Quick Reference:
────────────────────────────
  <n>    Send request number n
  {}      Reload namespace file
  {}      Delete archived responses
  {}, ?   This help
  {}      Quit
  Enter  Show the menu again
────────────────────────────"#,
        KEY_RELOAD, KEY_CLEAR, KEY_HELP, KEY_QUIT
    )
}

/// Shown before dispatch so the operator sees the URL actually used
pub fn draw_sending(out: &mut impl Write, call: &ResolvedCall) -> io::Result<()> {
    writeln!(
        out,
        "Sending {} request to: {}...",
        call.method.as_str().with(method_color(call.method.as_str())),
        call.url
    )?;
    out.flush()
}

pub fn draw_feedback(out: &mut impl Write, feedback: &Feedback) -> io::Result<()> {
    match feedback {
        Feedback::Completed(outcome) => {
            let status = format!("{} ({})", outcome.status, outcome.reason);
            let elapsed = format!("{} ms", outcome.elapsed_ms);
            writeln!(
                out,
                "Response returned with {} in {}",
                status.with(status_color(outcome.status)),
                elapsed.with(elapsed_color(outcome.elapsed_ms))
            )?;
            if let Some(warning) = &outcome.decode_warning {
                writeln!(out, "{}", warning.as_str().yellow())?;
            }
            let kind = match outcome.kind {
                ContentKind::Pdf => "pdf",
                ContentKind::Json => "json",
                ContentKind::Other => "text",
            };
            writeln!(out, "Saved {} to {}", kind, outcome.path.display())
        }
        Feedback::Failed { request, error } => {
            let message = match request {
                Some(name) => format!("{}: {}", name, error),
                None => error.to_string(),
            };
            writeln!(out, "{}", message.red())
        }
        Feedback::Reloaded { requests } => {
            writeln!(out, "{}", format!("Reloaded, {} request(s) available", requests).green())
        }
        Feedback::Cleared { removed } => writeln!(out, "Removed {} archived response(s)", removed),
        Feedback::Invalid(input) => writeln!(out, "{}", format!("Invalid input '{}'", input).red()),
        Feedback::Help => draw_help(out),
        Feedback::Menu | Feedback::Quit => Ok(()),
    }
}

pub fn prompt(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{} ", text.bold())?;
    out.flush()
}
