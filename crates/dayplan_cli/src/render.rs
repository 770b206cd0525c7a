use dayplan_core::{Event, Profile, ReminderNotice};

const TIME_FORMAT: &str = "%H:%M";
const DAY_HEADER_FORMAT: &str = "%A, %b %-d %Y";

pub fn event_line(event: &Event) -> String {
    let mut line = format!(
        "{}-{}  [{}] {:<6} {}",
        event.start.format(TIME_FORMAT),
        event.end.format(TIME_FORMAT),
        event.category.label(),
        event.priority.label(),
        event.title
    );
    if !event.location.trim().is_empty() {
        line.push_str(&format!(" @ {}", event.location));
    }
    line.push_str(&format!("  ({})", event.id()));
    line
}

pub fn day_header(date: chrono::NaiveDate) -> String {
    date.format(DAY_HEADER_FORMAT).to_string()
}

pub fn profile_line(profile: &Profile, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    format!("{marker} {}  ({})", profile.name, profile.id)
}

pub fn reminder_block(notice: &ReminderNotice) -> String {
    format!("Reminder ({})\n{}", notice.offset.label(), notice.message())
}
