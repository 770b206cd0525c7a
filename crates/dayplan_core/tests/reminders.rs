use chrono::{Duration, NaiveDate, NaiveDateTime};
use dayplan_core::{
    CoreConfig, CoreNotification, EventDraft, ManualClock, ReminderOffset, Scheduler,
};
use std::sync::{Arc, Mutex};
use std::time::Instant;

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn manual_scheduler(dir: &std::path::Path, clock: &Arc<ManualClock>) -> Scheduler {
    let config = CoreConfig::new(dir)
        .without_reminder_timer()
        .with_clock(Arc::clone(clock) as Arc<dyn dayplan_core::Clock>);
    Scheduler::open(config).unwrap()
}

fn standup() -> EventDraft {
    EventDraft::new("Standup", at(9, 0, 0), at(9, 30, 0))
        .location("Room 2")
        .reminder(ReminderOffset::Minutes15)
}

#[test]
fn standup_fires_once_inside_its_window() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(8, 44, 59)));
    let mut scheduler = manual_scheduler(dir.path(), &clock);
    scheduler.create_event(standup()).unwrap();

    assert!(scheduler.check_reminders().is_empty());

    clock.set(at(8, 45, 0));
    let fired = scheduler.check_reminders();
    assert_eq!(fired.len(), 1);
    assert_eq!(
        fired[0].message(),
        "Event: Standup\nTime: Jun 10, 2024 9:00 AM\nLocation: Room 2"
    );

    clock.set(at(8, 50, 0));
    assert!(scheduler.check_reminders().is_empty());

    clock.set(at(9, 31, 0));
    assert!(scheduler.check_reminders().is_empty());
}

#[test]
fn started_event_never_fires() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(9, 0, 0)));
    let mut scheduler = manual_scheduler(dir.path(), &clock);
    scheduler.create_event(standup()).unwrap();

    assert!(scheduler.check_reminders().is_empty());
}

#[test]
fn rescheduling_rearms_the_reminder() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(8, 50, 0)));
    let mut scheduler = manual_scheduler(dir.path(), &clock);
    let id = scheduler.create_event(standup()).unwrap();
    assert_eq!(scheduler.check_reminders().len(), 1);

    let annotated = EventDraft::from_event(&scheduler.event(id).unwrap())
        .description("agenda in the doc");
    scheduler.edit_event(id, &annotated).unwrap();
    assert!(scheduler.check_reminders().is_empty());

    let mut moved = annotated.clone();
    moved.start = at(9, 10, 0);
    moved.end = at(9, 40, 0);
    scheduler.edit_event(id, &moved).unwrap();
    clock.advance(Duration::minutes(5));
    assert_eq!(scheduler.check_reminders().len(), 1);
}

#[test]
fn fired_reminders_reach_listeners() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(8, 55, 0)));
    let mut scheduler = manual_scheduler(dir.path(), &clock);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    scheduler.add_listener(move |notification| {
        if let CoreNotification::ReminderFired(notice) = notification {
            sink.lock().unwrap().push(notice.title.clone());
        }
    });

    scheduler.create_event(standup()).unwrap();
    scheduler.check_reminders();
    assert_eq!(*seen.lock().unwrap(), vec!["Standup".to_string()]);
}

#[test]
fn background_timer_queues_notices_for_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(8, 50, 0)));
    let config = CoreConfig::new(dir.path())
        .with_reminder_interval(std::time::Duration::from_millis(10))
        .with_clock(Arc::clone(&clock) as Arc<dyn dayplan_core::Clock>);
    let mut scheduler = Scheduler::open(config).unwrap();
    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    scheduler.add_listener(move |notification| {
        if matches!(notification, CoreNotification::ReminderFired(_)) {
            *sink.lock().unwrap() += 1;
        }
    });

    scheduler.create_event(standup()).unwrap();

    let deadline = Instant::now() + std::time::Duration::from_secs(5);
    let mut delivered = 0;
    while delivered == 0 && Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
        delivered += scheduler.dispatch_reminders();
    }
    assert_eq!(delivered, 1);

    std::thread::sleep(std::time::Duration::from_millis(50));
    assert_eq!(scheduler.dispatch_reminders(), 0);
    assert!(scheduler.check_reminders().is_empty());
    assert_eq!(*seen.lock().unwrap(), 1);
    scheduler.shutdown();
}

#[test]
fn reminders_follow_the_active_profile() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(at(8, 50, 0)));
    let mut scheduler = manual_scheduler(dir.path(), &clock);
    scheduler.create_event(standup()).unwrap();

    let work = scheduler.create_profile("Work").unwrap();
    assert!(scheduler.switch_profile(work));
    assert!(scheduler.check_reminders().is_empty());

    let default_id = scheduler.profiles()[0].id;
    assert!(scheduler.switch_profile(default_id));
    assert_eq!(scheduler.check_reminders().len(), 1);
}

#[test]
fn deleting_the_active_profile_never_refires_its_reminders() {
    for _ in 0..50 {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(at(8, 50, 0)));
        let config = CoreConfig::new(dir.path())
            .with_reminder_interval(std::time::Duration::from_millis(1))
            .with_clock(Arc::clone(&clock) as Arc<dyn dayplan_core::Clock>);
        let mut scheduler = Scheduler::open(config).unwrap();
        let work = scheduler.create_profile("Work").unwrap();
        assert!(scheduler.switch_profile(work));

        let fired_for_work = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&fired_for_work);
        scheduler.add_listener(move |notification| {
            if let CoreNotification::ReminderFired(notice) = notification {
                if notice.profile_id == work {
                    *sink.lock().unwrap() += 1;
                }
            }
        });
        scheduler.create_event(standup()).unwrap();

        let deadline = Instant::now() + std::time::Duration::from_secs(5);
        while *fired_for_work.lock().unwrap() == 0 && Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(1));
            scheduler.dispatch_reminders();
        }
        assert_eq!(*fired_for_work.lock().unwrap(), 1);

        assert!(scheduler.delete_profile(work).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(5));
        scheduler.dispatch_reminders();
        assert!(scheduler.check_reminders().is_empty());

        assert_eq!(*fired_for_work.lock().unwrap(), 1);
        scheduler.shutdown();
    }
}
