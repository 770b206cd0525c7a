use crate::render;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use dayplan_core::{
    parse_date, parse_date_time, Category, CoreConfig, EventDraft, Priority, Profile, ProfileId,
    ReminderOffset, Scheduler,
};
use log::{info, warn};
use uuid::Uuid;

const WEEK_DAYS: usize = 7;

pub struct AddArgs {
    pub title: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub category: Category,
    pub priority: Priority,
    pub reminder: ReminderOffset,
    pub location: String,
    pub description: String,
}

/// One-shot commands don't need the background reminder thread.
fn open(config: CoreConfig) -> Result<Scheduler> {
    Scheduler::open(config.without_reminder_timer()).context("failed to open data directory")
}

fn date_or_today(text: Option<&str>) -> Result<NaiveDate> {
    match text {
        Some(text) => Ok(parse_date(text)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn list(config: CoreConfig, date: Option<&str>) -> Result<()> {
    let date = date_or_today(date)?;
    let scheduler = open(config)?;
    print_day(&scheduler, date);
    scheduler.shutdown();
    Ok(())
}

pub fn week(config: CoreConfig, from: Option<&str>) -> Result<()> {
    let from = date_or_today(from)?;
    let scheduler = open(config)?;
    let days = from.iter_days().take(WEEK_DAYS);
    for (index, day) in days.enumerate() {
        if index > 0 {
            println!();
        }
        print_day(&scheduler, day);
    }
    scheduler.shutdown();
    Ok(())
}

fn print_day(scheduler: &Scheduler, date: NaiveDate) {
    println!("{}", render::day_header(date));
    let events = scheduler.query_by_date(date);
    if events.is_empty() {
        println!("  no events");
    }
    for event in &events {
        println!("  {}", render::event_line(event));
    }
}

pub fn search(config: CoreConfig, text: &str) -> Result<()> {
    let scheduler = open(config)?;
    let results = scheduler.search(text);
    if results.is_empty() {
        println!("No events match `{}`.", text.trim());
    }
    for event in &results {
        println!("{}  {}", event.start.format("%Y-%m-%d"), render::event_line(event));
    }
    scheduler.shutdown();
    Ok(())
}

pub fn add(config: CoreConfig, args: AddArgs) -> Result<()> {
    let start = parse_date_time(&args.date, &args.start)?;
    let end = parse_date_time(&args.date, &args.end)?;
    let draft = EventDraft::new(args.title, start, end)
        .category(args.category)
        .priority(args.priority)
        .reminder(args.reminder)
        .location(args.location)
        .description(args.description);

    let mut scheduler = open(config)?;
    let id = scheduler.create_event(draft)?;
    info!("event=cli_command module=cli status=ok command=add event_id={id}");
    println!(
        "Added {} to profile `{}`.",
        id,
        scheduler.active_profile().name
    );
    scheduler.shutdown();
    Ok(())
}

pub fn delete(config: CoreConfig, id: &str) -> Result<()> {
    let id = Uuid::parse_str(id.trim()).with_context(|| format!("`{id}` is not an event id"))?;
    let mut scheduler = open(config)?;
    if scheduler.delete_event(id) {
        info!("event=cli_command module=cli status=ok command=delete event_id={id}");
        println!("Deleted {id}.");
    } else {
        info!(
            "event=cli_command module=cli status=skipped command=delete event_id={id} reason=not_found"
        );
        println!("No event {id} in profile `{}`.", scheduler.active_profile().name);
    }
    scheduler.shutdown();
    Ok(())
}

pub fn profiles(config: CoreConfig) -> Result<()> {
    let scheduler = open(config)?;
    let active_id = scheduler.active_profile().id;
    for profile in scheduler.profiles() {
        println!("{}", render::profile_line(profile, profile.id == active_id));
    }
    scheduler.shutdown();
    Ok(())
}

pub fn profile_create(config: CoreConfig, name: &str) -> Result<()> {
    let mut scheduler = open(config)?;
    let id = scheduler.create_profile(name)?;
    info!("event=cli_command module=cli status=ok command=profile_create profile_id={id}");
    println!("Created profile {id}.");
    scheduler.shutdown();
    Ok(())
}

pub fn profile_switch(config: CoreConfig, key: &str) -> Result<()> {
    let mut scheduler = open(config)?;
    let id = resolve_profile(scheduler.profiles(), key)?;
    if scheduler.switch_profile(id) {
        info!("event=cli_command module=cli status=ok command=profile_switch profile_id={id}");
        println!("Switched to `{}`.", scheduler.active_profile().name);
    } else {
        println!("`{}` is already active.", scheduler.active_profile().name);
    }
    scheduler.shutdown();
    Ok(())
}

pub fn profile_rename(config: CoreConfig, key: &str, name: &str) -> Result<()> {
    let mut scheduler = open(config)?;
    let id = resolve_profile(scheduler.profiles(), key)?;
    scheduler.rename_profile(id, name)?;
    info!("event=cli_command module=cli status=ok command=profile_rename profile_id={id}");
    println!("Renamed profile {id}.");
    scheduler.shutdown();
    Ok(())
}

pub fn profile_delete(config: CoreConfig, key: &str) -> Result<()> {
    let mut scheduler = open(config)?;
    let id = resolve_profile(scheduler.profiles(), key)?;
    scheduler.delete_profile(id)?;
    info!("event=cli_command module=cli status=ok command=profile_delete profile_id={id}");
    println!(
        "Deleted profile {id}; active profile is `{}`.",
        scheduler.active_profile().name
    );
    scheduler.shutdown();
    Ok(())
}

/// Prints reminders as the background timer fires them, until interrupted.
pub fn watch(config: CoreConfig) -> Result<()> {
    if config.reminder_interval.is_none() {
        bail!("reminder timer is disabled; unset DAYPLAN_REMINDER_SECS or set it above 0");
    }
    let scheduler = Scheduler::open(config).context("failed to open data directory")?;
    println!(
        "Watching reminders for `{}` (Ctrl-C to stop).",
        scheduler.active_profile().name
    );
    info!("event=cli_watch module=cli status=ok profile_id={}", scheduler.active_profile().id);
    for notice in scheduler.reminder_receiver().iter() {
        println!("\n{}", render::reminder_block(&notice));
    }
    scheduler.shutdown();
    Ok(())
}

/// Matches a profile by id, then by case-insensitive name.
fn resolve_profile(profiles: &[Profile], key: &str) -> Result<ProfileId> {
    let key = key.trim();
    if let Ok(id) = Uuid::parse_str(key) {
        if profiles.iter().any(|profile| profile.id == id) {
            return Ok(id);
        }
    }
    let mut matches = profiles
        .iter()
        .filter(|profile| profile.name.eq_ignore_ascii_case(key));
    match (matches.next(), matches.next()) {
        (Some(profile), None) => Ok(profile.id),
        (Some(_), Some(_)) => {
            warn!("event=profile_resolve module=cli status=error error_code=ambiguous_name");
            Err(anyhow!("several profiles are named `{key}`; use the id"))
        }
        (None, _) => {
            warn!("event=profile_resolve module=cli status=error error_code=not_found");
            Err(anyhow!("no profile matches `{key}`"))
        }
    }
}
