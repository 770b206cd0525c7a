//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical scheduled event record and its closed tag sets.
//! - Validate edit-boundary input (`EventDraft`) before it reaches the store.
//!
//! # Invariants
//! - `id` is assigned once and never reassigned or reused.
//! - `end >= start` is enforced by `EventDraft::validate`, not by the store.
//! - Identity is the id alone; two events with equal content stay distinct.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one scheduled event.
pub type EventId = Uuid;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const TIME_INPUT_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Work,
    Personal,
    Medical,
    Social,
    #[default]
    Other,
}

/// Display accent attached to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accent {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Accent {
    const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

type CategoryRow = (Category, &'static str, &'static str, Accent);

/// Per-category lookup table: (persisted tag, display label, accent).
static CATEGORY_TABLE: [CategoryRow; 5] = [
    (Category::Work, "WORK", "Work", Accent::rgb(70, 130, 180)),
    (Category::Personal, "PERSONAL", "Personal", Accent::rgb(50, 205, 50)),
    (Category::Medical, "MEDICAL", "Medical", Accent::rgb(220, 20, 60)),
    (Category::Social, "SOCIAL", "Social", Accent::rgb(255, 165, 0)),
    (Category::Other, "OTHER", "Other", Accent::rgb(128, 128, 128)),
];

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Medical,
        Category::Social,
        Category::Other,
    ];

    fn row(self) -> &'static CategoryRow {
        let index = match self {
            Self::Work => 0,
            Self::Personal => 1,
            Self::Medical => 2,
            Self::Social => 3,
            Self::Other => 4,
        };
        &CATEGORY_TABLE[index]
    }

    /// Stable persisted tag, e.g. `WORK`.
    pub fn as_tag(self) -> &'static str {
        self.row().1
    }

    pub fn label(self) -> &'static str {
        self.row().2
    }

    pub fn accent(self) -> Accent {
        self.row().3
    }

    /// Parses a persisted tag case-insensitively.
    pub fn from_tag(value: &str) -> Option<Self> {
        let value = value.trim();
        CATEGORY_TABLE
            .iter()
            .find(|row| row.1.eq_ignore_ascii_case(value))
            .map(|row| row.0)
    }
}

/// Event priority. Primary sort key in list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank; lower ranks list first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Medium Priority",
            Self::Low => "Low Priority",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_tag().eq_ignore_ascii_case(value))
    }
}

/// Lead time before `start` at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReminderOffset {
    #[default]
    None,
    Minutes15,
    Hour1,
    Day1,
}

impl ReminderOffset {
    pub const ALL: [ReminderOffset; 4] = [
        ReminderOffset::None,
        ReminderOffset::Minutes15,
        ReminderOffset::Hour1,
        ReminderOffset::Day1,
    ];

    /// Returns the lead time, or `None` when reminders are disabled.
    pub fn lead_time(self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Minutes15 => Some(Duration::minutes(15)),
            Self::Hour1 => Some(Duration::hours(1)),
            Self::Day1 => Some(Duration::days(1)),
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Minutes15 => "MINUTES_15",
            Self::Hour1 => "HOUR_1",
            Self::Day1 => "DAY_1",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No reminder",
            Self::Minutes15 => "15 minutes before",
            Self::Hour1 => "1 hour before",
            Self::Day1 => "1 day before",
        }
    }

    fn shorthand(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minutes15 => "15m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|offset| offset.as_tag().eq_ignore_ascii_case(value))
    }
}

/// Error returned when free-form input names no known tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTagError {
    pub kind: &'static str,
    pub value: String,
}

impl Display for UnknownTagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: `{}`", self.kind, self.value)
    }
}

impl Error for UnknownTagError {}

impl FromStr for Category {
    type Err = UnknownTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownTagError {
            kind: "category",
            value: s.to_string(),
        })
    }
}

impl FromStr for Priority {
    type Err = UnknownTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownTagError {
            kind: "priority",
            value: s.to_string(),
        })
    }
}

impl FromStr for ReminderOffset {
    type Err = UnknownTagError;

    /// Accepts persisted tags (`MINUTES_15`) and shorthands (`15m`, `1h`, `1d`, `none`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_tag(trimmed)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|offset| offset.shorthand().eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| UnknownTagError {
                kind: "reminder offset",
                value: s.to_string(),
            })
    }
}

/// Canonical scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub category: Category,
    pub priority: Priority,
    pub location: String,
    pub description: String,
    pub reminder: ReminderOffset,
}

impl Event {
    /// Creates an event with a generated id and default optional fields.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::with_id(Uuid::new_v4(), title, start, end)
    }

    /// Creates an event with a caller-provided id.
    ///
    /// Used by decode paths where identity already exists in storage.
    pub fn with_id(
        id: EventId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start,
            end,
            category: Category::default(),
            priority: Priority::default(),
            location: String::new(),
            description: String::new(),
            reminder: ReminderOffset::default(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Calendar date the event starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start_date() == date
    }

    /// `start - reminder`, or `None` when the event has no reminder.
    pub fn reminder_trigger(&self) -> Option<NaiveDateTime> {
        self.reminder.lead_time().map(|lead| self.start - lead)
    }
}

/// Edit-boundary validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle,
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    InvalidDate(String),
    InvalidTime(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "event end {end} is earlier than start {start}")
            }
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected HH:MM"),
        }
    }
}

impl Error for EventValidationError {}

/// Field set supplied by the edit workflow for create and edit commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub category: Category,
    pub priority: Priority,
    pub location: String,
    pub description: String,
    pub reminder: ReminderOffset,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            category: Category::default(),
            priority: Priority::default(),
            location: String::new(),
            description: String::new(),
            reminder: ReminderOffset::default(),
        }
    }

    /// Copies the editable fields of an existing event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            category: event.category,
            priority: event.priority,
            location: event.location.clone(),
            description: event.description.clone(),
            reminder: event.reminder,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reminder(mut self, reminder: ReminderOffset) -> Self {
        self.reminder = reminder;
        self
    }

    /// Checks the edit-boundary rules.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    /// - `EndBeforeStart` when `end < start`.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(EventValidationError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Builds a new event with a freshly generated id.
    pub fn into_event(self) -> Event {
        let mut event = Event::new(String::new(), self.start, self.end);
        self.apply_to(&mut event);
        event
    }

    /// Replaces every field of `event` except its id.
    pub fn apply_to(&self, event: &mut Event) {
        event.title = self.title.trim().to_string();
        event.start = self.start;
        event.end = self.end;
        event.category = self.category;
        event.priority = self.priority;
        event.location = self.location.clone();
        event.description = self.description.clone();
        event.reminder = self.reminder;
    }
}

/// Parses `YYYY-MM-DD` input.
pub fn parse_date(text: &str) -> Result<NaiveDate, EventValidationError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT)
        .map_err(|_| EventValidationError::InvalidDate(trimmed.to_string()))
}

/// Parses `HH:MM` or `HH:MM:SS` input.
pub fn parse_time(text: &str) -> Result<NaiveTime, EventValidationError> {
    let trimmed = text.trim();
    TIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| EventValidationError::InvalidTime(trimmed.to_string()))
}

/// Combines separately entered date and time fields.
pub fn parse_date_time(
    date_text: &str,
    time_text: &str,
) -> Result<NaiveDateTime, EventValidationError> {
    Ok(parse_date(date_text)?.and_time(parse_time(time_text)?))
}

#[cfg(test)]
mod tests {
    use super::{
        parse_date, parse_date_time, parse_time, Category, Event, EventDraft,
        EventValidationError, Priority, ReminderOffset,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
    }

    #[test]
    fn draft_rejects_blank_title() {
        let draft = EventDraft::new("   ", at(9, 0), at(9, 30));
        assert_eq!(draft.validate(), Err(EventValidationError::EmptyTitle));
    }

    #[test]
    fn draft_rejects_end_before_start() {
        let draft = EventDraft::new("Standup", at(9, 30), at(9, 0));
        assert!(matches!(
            draft.validate(),
            Err(EventValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn draft_accepts_zero_length_event() {
        let draft = EventDraft::new("Ping", at(9, 0), at(9, 0));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn apply_to_keeps_identity_and_trims_title() {
        let mut event = Event::new("Old", at(8, 0), at(8, 30));
        let id = event.id();
        EventDraft::new("  New title ", at(10, 0), at(11, 0))
            .priority(Priority::High)
            .apply_to(&mut event);

        assert_eq!(event.id(), id);
        assert_eq!(event.title, "New title");
        assert_eq!(event.start, at(10, 0));
        assert_eq!(event.priority, Priority::High);
    }

    #[test]
    fn into_event_generates_distinct_ids() {
        let draft = EventDraft::new("Same", at(9, 0), at(9, 30));
        let first = draft.clone().into_event();
        let second = draft.into_event();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn reminder_trigger_subtracts_lead_time() {
        let mut event = Event::new("Standup", at(9, 0), at(9, 30));
        assert_eq!(event.reminder_trigger(), None);

        event.reminder = ReminderOffset::Minutes15;
        assert_eq!(event.reminder_trigger(), Some(at(8, 45)));

        event.reminder = ReminderOffset::Day1;
        let expected = NaiveDate::from_ymd_opt(2024, 6, 9)
            .expect("valid date")
            .and_hms_opt(9, 0, 0)
            .expect("valid time");
        assert_eq!(event.reminder_trigger(), Some(expected));
    }

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!(Category::from_tag("medical"), Some(Category::Medical));
        assert_eq!(Priority::from_tag(" low "), Some(Priority::Low));
        assert_eq!(
            ReminderOffset::from_tag("hour_1"),
            Some(ReminderOffset::Hour1)
        );
        assert_eq!(Category::from_tag("HOLIDAY"), None);
    }

    #[test]
    fn reminder_offset_accepts_shorthand() {
        assert_eq!("15m".parse(), Ok(ReminderOffset::Minutes15));
        assert_eq!("1D".parse(), Ok(ReminderOffset::Day1));
        assert!("2h".parse::<ReminderOffset>().is_err());
    }

    #[test]
    fn category_accent_lookup_covers_all_variants() {
        for category in Category::ALL {
            assert_eq!(Category::from_tag(category.as_tag()), Some(category));
        }
        assert_eq!(Category::Work.accent().to_hex(), "#4682b4");
        assert_eq!(Category::Other.label(), "Other");
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn parse_helpers_report_invalid_input() {
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(
            parse_time("9am"),
            Err(EventValidationError::InvalidTime("9am".to_string()))
        );
        assert_eq!(
            parse_date_time("2024-06-10", "09:00").expect("valid input"),
            at(9, 0)
        );
        assert!(parse_time("23:59:59").is_ok());
    }
}
