//! Periodic reminder evaluation on a background thread.
//!
//! # Invariants
//! - The timer only reads the published event snapshot.
//! - Fired notices are handed over through a channel; delivery to listeners
//!   happens on whichever thread drains it.
//! - Stopping is idempotent and joins the thread.

use crate::reminder::clock::Clock;
use crate::reminder::engine::{ReminderEngine, ReminderNotice};
use crate::store::EventFeed;
use chrono::NaiveDateTime;
use crossbeam_channel as chan;
use log::{debug, error, info};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(30);

const REMINDER_WORKER_NAME: &str = "dayplan-reminders";

/// Runs one engine tick against the latest snapshot in `feed`.
pub fn check_feed(
    feed: &EventFeed,
    engine: &Mutex<ReminderEngine>,
    now: NaiveDateTime,
) -> Vec<ReminderNotice> {
    let snapshot = feed.current();
    engine
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .tick(snapshot.profile_id, &snapshot.events, now)
}

/// Handle to the running reminder thread.
pub struct ReminderTimer {
    stop_tx: Option<chan::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ReminderTimer {
    /// Starts ticking every `interval`; fired notices are sent to `fired_tx`.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn start(
        interval: Duration,
        feed: EventFeed,
        engine: Arc<Mutex<ReminderEngine>>,
        clock: Arc<dyn Clock>,
        fired_tx: chan::Sender<ReminderNotice>,
    ) -> io::Result<Self> {
        let (stop_tx, stop_rx) = chan::bounded::<()>(1);
        let worker = thread::Builder::new()
            .name(REMINDER_WORKER_NAME.to_string())
            .spawn(move || {
                let ticker = chan::tick(interval);
                loop {
                    let keep_running = chan::select! {
                        recv(ticker) -> _ => deliver(&feed, &engine, clock.as_ref(), &fired_tx),
                        recv(stop_rx) -> _ => false,
                    };
                    if !keep_running {
                        break;
                    }
                }
                debug!("event=reminder_timer_stop module=reminder status=ok");
            })?;

        info!(
            "event=reminder_timer_start module=reminder status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(&mut self) {
        // Dropping the sender also wakes the select.
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=reminder_timer_stop module=reminder status=error error_code=worker_panicked");
            }
        }
    }
}

/// Returns `false` once nobody is listening for notices.
fn deliver(
    feed: &EventFeed,
    engine: &Mutex<ReminderEngine>,
    clock: &dyn Clock,
    fired_tx: &chan::Sender<ReminderNotice>,
) -> bool {
    check_feed(feed, engine, clock.now())
        .into_iter()
        .all(|notice| fired_tx.send(notice).is_ok())
}

impl Drop for ReminderTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::ReminderTimer;
    use crate::model::event::{EventDraft, ReminderOffset};
    use crate::notify::Notifier;
    use crate::reminder::clock::Clock;
    use crate::reminder::engine::ReminderEngine;
    use crate::storage::{DataLayout, SaveQueue};
    use crate::store::EventStore;
    use chrono::{Duration as ChronoDuration, NaiveDateTime};
    use crossbeam_channel as chan;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;
    use uuid::Uuid;

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    #[test]
    fn timer_delivers_each_reminder_once() {
        let dir = tempdir().expect("temp dir");
        let queue = SaveQueue::start().expect("worker should start");
        let mut store = EventStore::open(
            Uuid::new_v4(),
            DataLayout::new(dir.path()),
            queue.handle(),
            Notifier::new(),
        );
        let now = chrono::Local::now().naive_local();
        let start = now + ChronoDuration::minutes(10);
        store.add(
            EventDraft::new("Soon", start, start + ChronoDuration::minutes(30))
                .reminder(ReminderOffset::Minutes15),
        );

        let (fired_tx, fired_rx) = chan::unbounded();
        let mut timer = ReminderTimer::start(
            Duration::from_millis(10),
            store.feed(),
            Arc::new(Mutex::new(ReminderEngine::new())),
            Arc::new(FixedClock(now)),
            fired_tx,
        )
        .expect("timer should start");

        let notice = fired_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("reminder should fire");
        assert_eq!(notice.title, "Soon");

        std::thread::sleep(Duration::from_millis(50));
        timer.stop();
        assert!(!timer.is_running());
        assert!(fired_rx.try_recv().is_err());
    }
}
