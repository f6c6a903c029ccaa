//! Line codec for the project log.
//!
//! # Responsibility
//! - Serialize one `LogEntry` to its bit-exact line form.
//! - Parse lines back with explicit success/failure outcomes.
//!
//! # Invariants
//! - Encoding and decoding are pure: no I/O, no logging.
//! - Decoders never panic on arbitrary input; callers skip failed lines.
//!
//! Line grammar:
//! `[[<name>]],<YYYY-MM-DD>,<HH:mm:ss|empty>,<old|null|empty>,<new>\n`

use crate::model::entry::{EntryOrigin, LogEntry};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NAME_OPEN: &str = "[[";
const NAME_CLOSE: &str = "]],";
const NULL_STATUS: &str = "null";
const FIELDS_AFTER_NAME: usize = 4;

/// Reason a line does not match the log grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineParseError {
    /// Line does not start with `[[`.
    MissingNameOpen,
    /// `[[` is immediately followed by `]`.
    EmptyName,
    /// No `]` terminates the name.
    UnterminatedName,
    /// The name is not followed by `]],`.
    MissingSeparator,
    /// Too few comma-separated fields after the name.
    FieldCount { found: usize },
    /// Date field is blank.
    EmptyDate,
}

impl Display for LineParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNameOpen => write!(f, "line does not start with `[[`"),
            Self::EmptyName => write!(f, "record name is empty"),
            Self::UnterminatedName => write!(f, "record name is not terminated by `]`"),
            Self::MissingSeparator => write!(f, "record name is not followed by `]],`"),
            Self::FieldCount { found } => write!(
                f,
                "expected at least {FIELDS_AFTER_NAME} fields after record name, found {found}"
            ),
            Self::EmptyDate => write!(f, "date field is empty"),
        }
    }
}

impl Error for LineParseError {}

/// Encodes one entry, including the trailing `\n`.
///
/// A missing status is written as `null` on change entries. Backfill entries
/// leave both the time and the previous status empty.
pub fn encode(entry: &LogEntry) -> String {
    let time = entry.time.as_deref().unwrap_or("");
    let old_status = match (entry.old_status.as_deref(), entry.origin) {
        (Some(status), _) => status,
        (None, EntryOrigin::Change) => NULL_STATUS,
        (None, EntryOrigin::Backfill) => "",
    };
    let new_status = entry.new_status.as_deref().unwrap_or(NULL_STATUS);

    format!(
        "[[{}]],{},{},{},{}\n",
        entry.record_name, entry.date, time, old_status, new_status
    )
}

/// Parses the bracketed record name prefix of one line.
///
/// Accepts exactly what `^\[\[([^\]]+)\]\],` accepts: the name runs up to the
/// first `]` and must be non-empty.
pub fn decode_name(line: &str) -> Result<&str, LineParseError> {
    let rest = line
        .strip_prefix(NAME_OPEN)
        .ok_or(LineParseError::MissingNameOpen)?;
    let end = rest.find(']').ok_or(LineParseError::UnterminatedName)?;
    if end == 0 {
        return Err(LineParseError::EmptyName);
    }

    let (name, tail) = rest.split_at(end);
    if !tail.starts_with(NAME_CLOSE) {
        return Err(LineParseError::MissingSeparator);
    }
    Ok(name)
}

/// Parses a full line into an entry.
///
/// An empty time field marks a backfill line; the literal `null` maps to an
/// absent status. The old status ends at the first `,` after the time, so a
/// status containing `,` is only recoverable in the new-status position.
pub fn decode_entry(line: &str) -> Result<LogEntry, LineParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let name = decode_name(line)?;
    let fields_start = NAME_OPEN.len() + name.len() + NAME_CLOSE.len();
    let fields = line[fields_start..]
        .splitn(FIELDS_AFTER_NAME, ',')
        .collect::<Vec<_>>();
    let &[date, time, old_status, new_status] = fields.as_slice() else {
        return Err(LineParseError::FieldCount {
            found: fields.len(),
        });
    };

    let date = date.trim();
    if date.is_empty() {
        return Err(LineParseError::EmptyDate);
    }

    let origin = if time.is_empty() {
        EntryOrigin::Backfill
    } else {
        EntryOrigin::Change
    };

    Ok(LogEntry {
        record_name: name.to_string(),
        date: date.to_string(),
        time: non_empty(time),
        old_status: parse_status(old_status),
        new_status: parse_status(new_status),
        origin,
    })
}

/// Collects every record name already present in `content`.
///
/// Lines that do not match the grammar are skipped silently.
pub fn indexed_names(content: &str) -> HashSet<&str> {
    content
        .lines()
        .filter_map(|line| decode_name(line).ok())
        .collect()
}

/// Decodes every well-formed line of `content`, in file order.
pub fn decode_all(content: &str) -> Vec<LogEntry> {
    content
        .lines()
        .filter_map(|line| decode_entry(line).ok())
        .collect()
}

fn parse_status(field: &str) -> Option<String> {
    if field == NULL_STATUS {
        return None;
    }
    non_empty(field)
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_all, decode_entry, decode_name, encode, indexed_names, LineParseError};
    use crate::model::entry::{EntryOrigin, LogEntry};

    #[test]
    fn encode_change_entry_matches_line_format() {
        let entry = LogEntry::change(
            "a",
            "2026-10-14",
            "09:30:00",
            Some("todo".to_string()),
            Some("doing".to_string()),
        );
        assert_eq!(encode(&entry), "[[a]],2026-10-14,09:30:00,todo,doing\n");
    }

    #[test]
    fn encode_change_entry_writes_null_for_missing_status() {
        let entry = LogEntry::change("a", "2026-10-14", "09:30:00", None, Some("done".into()));
        assert_eq!(encode(&entry), "[[a]],2026-10-14,09:30:00,null,done\n");

        let cleared = LogEntry::change("a", "2026-10-14", "09:30:00", Some("done".into()), None);
        assert_eq!(encode(&cleared), "[[a]],2026-10-14,09:30:00,done,null\n");
    }

    #[test]
    fn encode_backfill_entry_leaves_time_and_old_status_empty() {
        let entry = LogEntry::backfill("plan", "2026-10-14", "backlog");
        assert_eq!(encode(&entry), "[[plan]],2026-10-14,,,backlog\n");
    }

    #[test]
    fn decode_name_recovers_encoded_names() {
        for name in ["a", "Plan B", "weekly-review", "ünïcødé", "with [bracket", "x.y"] {
            let line = encode(&LogEntry::backfill(name, "2026-10-14", "backlog"));
            assert_eq!(decode_name(&line), Ok(name), "name `{name}` should round-trip");
        }
    }

    #[test]
    fn decode_name_rejects_noise() {
        assert_eq!(decode_name(""), Err(LineParseError::MissingNameOpen));
        assert_eq!(decode_name("random text"), Err(LineParseError::MissingNameOpen));
        assert_eq!(decode_name("[[]],2026-10-14"), Err(LineParseError::EmptyName));
        assert_eq!(decode_name("[[partial"), Err(LineParseError::UnterminatedName));
        assert_eq!(decode_name("[[a]]2026"), Err(LineParseError::MissingSeparator));
        assert_eq!(decode_name("[[a]b]],x"), Err(LineParseError::MissingSeparator));
    }

    #[test]
    fn decode_entry_parses_change_and_backfill_lines() {
        let change = decode_entry("[[a]],2026-10-14,09:30:00,null,doing").unwrap();
        assert_eq!(change.origin, EntryOrigin::Change);
        assert_eq!(change.time.as_deref(), Some("09:30:00"));
        assert_eq!(change.old_status, None);
        assert_eq!(change.new_status.as_deref(), Some("doing"));

        let backfill = decode_entry("[[b]],2026-10-14,,,backlog\n").unwrap();
        assert_eq!(backfill, LogEntry::backfill("b", "2026-10-14", "backlog"));
    }

    #[test]
    fn decode_entry_reports_field_count_mismatch() {
        assert_eq!(
            decode_entry("[[a]],2026-10-14,todo"),
            Err(LineParseError::FieldCount { found: 2 })
        );
        assert_eq!(
            decode_entry("[[a]],,09:00:00,todo,done"),
            Err(LineParseError::EmptyDate)
        );
    }

    #[test]
    fn decode_entry_keeps_commas_in_new_status() {
        let entry = LogEntry::change(
            "a",
            "2026-10-14",
            "09:00:00",
            Some("todo".to_string()),
            Some("review, blocked".to_string()),
        );
        let line = encode(&entry);
        assert_eq!(line, "[[a]],2026-10-14,09:00:00,todo,review, blocked\n");
        assert_eq!(decode_entry(&line), Ok(entry));
    }

    #[test]
    fn indexed_names_skips_malformed_lines() {
        let content = "garbage\n[[a]],2026-10-14,,,backlog\n[[broken\n,,,\n[[b]],x,y,z,w\n";
        let names = indexed_names(content);
        assert_eq!(names.len(), 2);
        assert!(names.contains("a"));
        assert!(names.contains("b"));
    }

    #[test]
    fn decode_all_keeps_file_order() {
        let content = "[[a]],2026-10-13,10:00:00,todo,doing\nnoise\n[[b]],2026-10-14,,,backlog\n";
        let names = decode_all(content)
            .into_iter()
            .map(|entry| entry.record_name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
