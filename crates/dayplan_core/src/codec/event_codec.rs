//! Line-oriented record codec for event collections.
//!
//! # Responsibility
//! - Encode events into `EVENT_START` .. `EVENT_END` record blocks.
//! - Decode record blocks, repairing or skipping malformed records.
//!
//! # Invariants
//! - `decode(encode(events))` reproduces every event field-for-field.
//! - Decoding never fails as a whole; bad records are counted, not raised.
//! - Free-text values never span lines (`\`, LF and CR are escaped).

use crate::model::event::{Category, Event, EventId, Priority, ReminderOffset};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use uuid::Uuid;

const RECORD_START: &str = "EVENT_START";
const RECORD_END: &str = "EVENT_END";

const KEY_ID: &str = "ID";
const KEY_TITLE: &str = "TITLE";
// Older files used `NAME` for the title line.
const KEY_TITLE_LEGACY: &str = "NAME";
const KEY_START: &str = "START";
const KEY_END: &str = "END";
const KEY_DESCRIPTION: &str = "DESCRIPTION";
const KEY_CATEGORY: &str = "CATEGORY";
const KEY_PRIORITY: &str = "PRIORITY";
const KEY_LOCATION: &str = "LOCATION";
const KEY_REMINDER: &str = "REMINDER";

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_TIME_FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// Per-decode counters used for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Records turned into events.
    pub loaded: usize,
    /// Records dropped (missing title/start/end, truncated, duplicate id).
    pub skipped: usize,
    /// Loaded records where at least one field fell back to a default.
    pub repaired: usize,
}

/// Decoded events plus the report describing what was dropped or repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Events in file order.
    pub events: Vec<Event>,
    pub report: DecodeReport,
}

/// Encodes events into the persisted record format.
pub fn encode_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<u8> {
    let mut out = String::new();
    for event in events {
        out.push_str(RECORD_START);
        out.push('\n');
        push_field(&mut out, KEY_ID, &event.id().to_string());
        push_field(&mut out, KEY_TITLE, &escape(&event.title));
        push_field(&mut out, KEY_START, &format_date_time(event.start));
        push_field(&mut out, KEY_END, &format_date_time(event.end));
        push_field(&mut out, KEY_DESCRIPTION, &escape(&event.description));
        push_field(&mut out, KEY_CATEGORY, event.category.as_tag());
        push_field(&mut out, KEY_PRIORITY, event.priority.as_tag());
        push_field(&mut out, KEY_LOCATION, &escape(&event.location));
        push_field(&mut out, KEY_REMINDER, event.reminder.as_tag());
        out.push_str(RECORD_END);
        out.push('\n');
    }
    out.into_bytes()
}

/// Decodes a persisted byte stream, dropping what cannot be repaired.
pub fn decode_events(bytes: &[u8]) -> Vec<Event> {
    decode_events_with_report(bytes).events
}

/// Decodes a persisted byte stream and reports skipped/repaired records.
///
/// Invalid UTF-8 is replaced lossily rather than rejected.
pub fn decode_events_with_report(bytes: &[u8]) -> DecodeOutcome {
    let text = String::from_utf8_lossy(bytes);
    let mut outcome = DecodeOutcome::default();
    let mut seen_ids: HashSet<EventId> = HashSet::new();
    let mut current: Option<PendingRecord> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim_end_matches('\r');

        if line == RECORD_START {
            // An unterminated record is abandoned when the next one begins.
            if current.replace(PendingRecord::default()).is_some() {
                outcome.report.skipped += 1;
            }
            continue;
        }

        if line == RECORD_END {
            let Some(record) = current.take() else {
                continue;
            };
            match record.finish() {
                Some((event, repaired)) if seen_ids.insert(event.id()) => {
                    outcome.report.loaded += 1;
                    if repaired {
                        outcome.report.repaired += 1;
                    }
                    outcome.events.push(event);
                }
                _ => outcome.report.skipped += 1,
            }
            continue;
        }

        if let Some(record) = current.as_mut() {
            if let Some((key, value)) = line.split_once(':') {
                record.set(key.trim(), value);
            }
        }
    }

    // Truncated at EOF.
    if current.is_some() {
        outcome.report.skipped += 1;
    }

    outcome
}

#[derive(Debug, Default)]
struct PendingRecord {
    id: Option<String>,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
    description: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    location: Option<String>,
    reminder: Option<String>,
}

impl PendingRecord {
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            KEY_ID => &mut self.id,
            KEY_TITLE | KEY_TITLE_LEGACY => &mut self.title,
            KEY_START => &mut self.start,
            KEY_END => &mut self.end,
            KEY_DESCRIPTION => &mut self.description,
            KEY_CATEGORY => &mut self.category,
            KEY_PRIORITY => &mut self.priority,
            KEY_LOCATION => &mut self.location,
            KEY_REMINDER => &mut self.reminder,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    /// Returns the event and whether any field was repaired.
    fn finish(self) -> Option<(Event, bool)> {
        let title = unescape(self.title.as_deref()?);
        if title.trim().is_empty() {
            return None;
        }
        let start = parse_date_time(self.start.as_deref()?)?;
        let end = parse_date_time(self.end.as_deref()?)?;

        let mut repaired = false;
        let id = match self
            .id
            .as_deref()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
        {
            Some(id) => id,
            None => {
                repaired = true;
                Uuid::new_v4()
            }
        };

        let mut event = Event::with_id(id, title, start, end);
        event.category =
            tag_or_default(self.category.as_deref(), Category::from_tag, &mut repaired);
        event.priority =
            tag_or_default(self.priority.as_deref(), Priority::from_tag, &mut repaired);
        event.reminder = tag_or_default(
            self.reminder.as_deref(),
            ReminderOffset::from_tag,
            &mut repaired,
        );
        event.description = self
            .description
            .as_deref()
            .map(unescape)
            .unwrap_or_default();
        event.location = self.location.as_deref().map(unescape).unwrap_or_default();

        Some((event, repaired))
    }
}

/// Missing tags default silently; unrecognized tags default and mark the record repaired.
fn tag_or_default<T: Default>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    repaired: &mut bool,
) -> T {
    match value {
        None => T::default(),
        Some(text) => parse(text).unwrap_or_else(|| {
            *repaired = true;
            T::default()
        }),
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push(':');
    out.push_str(value);
    out.push('\n');
}

fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT_NO_SECONDS))
        .ok()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode_events_with_report, escape, parse_date_time, unescape};
    use chrono::NaiveDate;

    #[test]
    fn escape_roundtrips_control_characters() {
        let raw = "line one\nline two\r\\path";
        let escaped = escape(raw);
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
        assert_eq!(unescape(&escaped), raw);
    }

    #[test]
    fn unescape_keeps_unknown_sequences_and_trailing_backslash() {
        assert_eq!(unescape("a\\tb"), "a\\tb");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn parse_date_time_accepts_minutes_only_form() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10)
            .expect("valid date")
            .and_hms_opt(9, 0, 0)
            .expect("valid time");
        assert_eq!(parse_date_time("2024-06-10T09:00"), Some(expected));
        assert_eq!(parse_date_time("2024-06-10T09:00:00"), Some(expected));
        assert_eq!(parse_date_time("June 10th"), None);
    }

    #[test]
    fn stray_lines_and_unknown_keys_are_ignored() {
        let text = "garbage before\nEVENT_START\nTITLE:Lunch\nSTART:2024-06-10T12:00:00\nEND:2024-06-10T13:00:00\nCOLOR:blue\nEVENT_END\ntrailing\n";
        let outcome = decode_events_with_report(text.as_bytes());
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].title, "Lunch");
        // Missing id is repaired with a fresh one.
        assert_eq!(outcome.report.repaired, 1);
        assert_eq!(outcome.report.skipped, 0);
    }

    #[test]
    fn legacy_name_key_is_read_as_title() {
        let text = "EVENT_START\nNAME:Dentist\nSTART:2024-06-11T08:00\nEND:2024-06-11T09:00\nEVENT_END\n";
        let outcome = decode_events_with_report(text.as_bytes());
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].title, "Dentist");
    }
}
