//! Line commands of the terminal front end.

use crate::app::Event;
use crate::predictor::SymptomSchema;

pub const HELP_TEXT: &str = "\
Commands:
  symptoms [filter]     list known symptoms
  select a, b, c        add symptoms to the selection (alias: add)
  remove a, b           remove symptoms from the selection
  clear                 clear the selection
  ask <question>        ask the health assistant (or start a line with '?')
  show                  show the current state
  help                  show this help
  quit                  leave (alias: exit)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(Event),
    ListSymptoms(Option<String>),
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Splits a comma-separated symptom list, dropping blanks.
pub fn split_symptoms(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if let Some(question) = line.strip_prefix('?') {
        return Command::Event(Event::Ask(question.trim().to_string()));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_lowercase().as_str() {
        "select" | "add" => Command::Event(Event::AddSymptoms(split_symptoms(rest))),
        "remove" => Command::Event(Event::RemoveSymptoms(split_symptoms(rest))),
        "clear" => Command::Event(Event::ClearSymptoms),
        "ask" => Command::Event(Event::Ask(rest.to_string())),
        "symptoms" => Command::ListSymptoms((!rest.is_empty()).then(|| rest.to_string())),
        "show" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(word.to_string()),
    }
}

/// Schema symptoms containing `filter` (case-insensitive), in schema order.
pub fn list_symptoms<'a>(schema: &'a SymptomSchema, filter: Option<&str>) -> Vec<&'a str> {
    let filter = filter.map(str::to_lowercase);
    schema
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| filter.as_ref().map_or(true, |f| name.to_lowercase().contains(f.as_str())))
        .collect()
}
