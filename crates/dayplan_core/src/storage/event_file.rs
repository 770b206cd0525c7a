//! Event file loading.
//!
//! Saving goes through `SaveQueue` with bytes from `codec::encode_events`.

use crate::codec::decode_events_with_report;
use crate::model::event::Event;
use log::{error, info, warn};
use std::io;
use std::path::Path;
use std::time::Instant;

/// Reads and decodes one profile's event file.
///
/// # Invariants
/// - A missing file yields an empty collection.
/// - An unreadable file is logged and yields an empty collection.
/// - Malformed records are skipped or repaired, never fatal.
pub fn load_events(path: &Path) -> Vec<Event> {
    let started_at = Instant::now();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(
                "event=events_load module=storage status=ok path={} events=0 reason=missing_file",
                path.display()
            );
            return Vec::new();
        }
        Err(err) => {
            error!(
                "event=events_load module=storage status=error path={} error={}",
                path.display(),
                err
            );
            return Vec::new();
        }
    };

    let outcome = decode_events_with_report(&bytes);
    let report = outcome.report;
    if report.skipped > 0 || report.repaired > 0 {
        warn!(
            "event=events_load module=storage status=repaired path={} events={} skipped={} repaired={} duration_ms={}",
            path.display(),
            report.loaded,
            report.skipped,
            report.repaired,
            started_at.elapsed().as_millis()
        );
    } else {
        info!(
            "event=events_load module=storage status=ok path={} events={} duration_ms={}",
            path.display(),
            report.loaded,
            started_at.elapsed().as_millis()
        );
    }
    outcome.events
}

#[cfg(test)]
mod tests {
    use super::load_events;
    use crate::codec::encode_events;
    use crate::model::event::Event;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        assert!(load_events(&dir.path().join("absent.dat")).is_empty());
    }

    #[test]
    fn directory_in_place_of_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        assert!(load_events(dir.path()).is_empty());
    }

    #[test]
    fn written_file_loads_back() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("events.dat");
        let start = NaiveDate::from_ymd_opt(2024, 6, 10)
            .expect("valid date")
            .and_hms_opt(9, 0, 0)
            .expect("valid time");
        let event = Event::new("Standup", start, start);
        std::fs::write(&path, encode_events([&event])).expect("write should succeed");

        assert_eq!(load_events(&path), vec![event]);
    }
}
