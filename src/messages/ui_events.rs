//! UI events - operator input mapped to session commands

/// Reserved control inputs. Letters only, so they never collide with a menu index.
pub const KEY_RELOAD: &str = "r";
pub const KEY_CLEAR: &str = "c";
pub const KEY_QUIT: &str = "q";
pub const KEY_HELP: &str = "h";

/// Events generated from one line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// 1-based index into the current menu
    Select(usize),
    Reload,
    ClearResponses,
    ShowHelp,
    /// Empty input: draw the menu again
    Redraw,
    Quit,
    Invalid(String),
}

pub fn parse_input(line: &str) -> UiEvent {
    let input = line.trim();
    if input.is_empty() {
        return UiEvent::Redraw;
    }

    match input.to_lowercase().as_str() {
        KEY_RELOAD => UiEvent::Reload,
        KEY_CLEAR => UiEvent::ClearResponses,
        KEY_QUIT | "quit" | "exit" => UiEvent::Quit,
        KEY_HELP | "?" => UiEvent::ShowHelp,
        _ => match input.parse::<usize>() {
            Ok(n) if n > 0 => UiEvent::Select(n),
            _ => UiEvent::Invalid(input.to_string()),
        },
    }
}
