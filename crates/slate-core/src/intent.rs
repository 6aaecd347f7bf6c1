use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::datastore::DataStore;
use crate::state::Session;
use crate::task::{Property, ViewFilter};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit(String),
    Toggle { id: u64, property: Property },
    BeginEdit(u64),
    /// Commit the edit field. Enter, blur, and the explicit Save action
    /// all collapse into this one intent; applying it with no edit in
    /// progress is a harmless no-op.
    SaveEdit(String),
    Remove(u64),
    RemoveAll,
    SetFilter(ViewFilter),
    ToggleTheme,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Help,
    Quit,
}

pub fn known_intent_names() -> Vec<&'static str> {
    vec![
        "add", "done", "undo", "flag", "unflag", "edit", "save", "remove", "clear", "filter",
        "theme", "help", "quit", "exit",
    ]
}

pub fn expand_intent_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Returns `None` for lines naming no intent (unknown verb, malformed
/// id, unknown filter). Only consulted outside edit mode; while a row is
/// edited the field owns the input and every line is a `SaveEdit` commit.
pub fn parse_line(line: &str) -> Option<Intent> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest),
        None => (line, ""),
    };

    let known = known_intent_names();
    let verb = expand_intent_abbrev(head, &known)?;

    match verb {
        "add" => Some(Intent::Submit(rest.to_string())),
        "done" | "undo" => parse_id(rest).map(|id| Intent::Toggle {
            id,
            property: Property::Completed,
        }),
        "flag" | "unflag" => parse_id(rest).map(|id| Intent::Toggle {
            id,
            property: Property::Important,
        }),
        "edit" => parse_id(rest).map(Intent::BeginEdit),
        "save" => Some(Intent::SaveEdit(rest.trim().to_string())),
        "remove" => parse_id(rest).map(Intent::Remove),
        "clear" => Some(Intent::RemoveAll),
        "filter" => ViewFilter::parse(rest.trim()).map(Intent::SetFilter),
        "theme" => Some(Intent::ToggleTheme),
        "help" => Some(Intent::Help),
        "quit" | "exit" => Some(Intent::Quit),
        _ => None,
    }
}

fn parse_id(token: &str) -> Option<u64> {
    token.trim().parse::<u64>().ok()
}

/// State mutation, then the wholesale persistence write when the stored
/// data changed, before the caller re-renders.
#[instrument(skip(session, theme, store, now))]
pub fn apply(
    intent: Intent,
    session: &mut Session,
    theme: &mut Theme,
    store: &DataStore,
    now: DateTime<Utc>,
) -> anyhow::Result<Outcome> {
    match intent {
        Intent::Submit(text) => {
            if session.create(&text, now) {
                store.save_tasks(session.tasks())?;
            }
        }
        Intent::Toggle { id, property } => {
            if session.toggle(id, property) {
                store.save_tasks(session.tasks())?;
            }
        }
        Intent::BeginEdit(id) => session.begin_edit(id),
        Intent::SaveEdit(text) => match session.editing_id() {
            Some(id) => {
                if session.set_title(id, text) {
                    store.save_tasks(session.tasks())?;
                }
            }
            None => debug!("save with no edit in progress ignored"),
        },
        Intent::Remove(id) => {
            if session.remove(id) {
                store.save_tasks(session.tasks())?;
            }
        }
        Intent::RemoveAll => {
            if session.remove_all() {
                store.save_tasks(session.tasks())?;
            }
        }
        Intent::SetFilter(filter) => session.set_filter(filter),
        Intent::ToggleTheme => {
            *theme = theme.toggled();
            info!(theme = theme.as_str(), "display mode toggled");
            store.save_theme(*theme)?;
        }
        Intent::Help => return Ok(Outcome::Help),
        Intent::Quit => return Ok(Outcome::Quit),
    }

    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::{Intent, expand_intent_abbrev, known_intent_names, parse_line};
    use crate::task::{Property, ViewFilter};

    #[test]
    fn verbs_map_to_intents() {
        assert_eq!(
            parse_line("add Buy milk"),
            Some(Intent::Submit("Buy milk".to_string()))
        );
        assert_eq!(
            parse_line("done 42"),
            Some(Intent::Toggle {
                id: 42,
                property: Property::Completed
            })
        );
        assert_eq!(
            parse_line("undo 42"),
            Some(Intent::Toggle {
                id: 42,
                property: Property::Completed
            })
        );
        assert_eq!(
            parse_line("flag 7"),
            Some(Intent::Toggle {
                id: 7,
                property: Property::Important
            })
        );
        assert_eq!(parse_line("edit 7"), Some(Intent::BeginEdit(7)));
        assert_eq!(
            parse_line("filter important"),
            Some(Intent::SetFilter(ViewFilter::Important))
        );
        assert_eq!(parse_line("clear"), Some(Intent::RemoveAll));
        assert_eq!(parse_line("theme"), Some(Intent::ToggleTheme));
    }

    #[test]
    fn add_with_no_text_is_an_empty_submit() {
        // routes through create, which rejects it and raises the indicator
        assert_eq!(parse_line("add"), Some(Intent::Submit(String::new())));
        assert_eq!(parse_line("add    "), Some(Intent::Submit(String::new())));
    }

    #[test]
    fn malformed_or_unknown_lines_yield_nothing() {
        assert_eq!(parse_line("done"), None);
        assert_eq!(parse_line("done seven"), None);
        assert_eq!(parse_line("filter urgent"), None);
        assert_eq!(parse_line("frobnicate"), None);
    }

    #[test]
    fn unambiguous_prefixes_expand() {
        let known = known_intent_names();
        assert_eq!(expand_intent_abbrev("ad", &known), Some("add"));
        assert_eq!(expand_intent_abbrev("th", &known), Some("theme"));
        // "f" could be flag or filter
        assert_eq!(expand_intent_abbrev("f", &known), None);
        assert_eq!(parse_line("cl"), Some(Intent::RemoveAll));
    }
}
