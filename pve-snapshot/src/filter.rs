//! Prefix and age filters over a raw snapshot list.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::SnapshotRecord;

/// Name of the entry describing the instance's live state.
pub const CURRENT_SNAPSHOT: &str = "current";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// True when a snapshot taken at `snaptime` is strictly more than
/// `older_than_days` days old at `now`.
///
/// A snapshot exactly `older_than_days` old does not qualify.
pub fn is_older_than(snaptime: i64, older_than_days: u32, now: DateTime<Utc>) -> bool {
    let age_millis = now
        .timestamp_millis()
        .saturating_sub(snaptime.saturating_mul(1000));
    age_millis > i64::from(older_than_days) * MILLIS_PER_DAY
}

/// Names of the snapshots that pass both filters, in source order.
pub fn filter_snapshots(
    records: &[SnapshotRecord],
    prefix: Option<&str>,
    older_than_days: u32,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut names = Vec::new();

    for record in records {
        if record.name == CURRENT_SNAPSHOT {
            continue;
        }

        if let Some(prefix) = prefix {
            if !record.name.starts_with(prefix) {
                continue;
            }
        }

        let Some(snaptime) = record.snaptime else {
            debug!(snapshot = %record.name, "snapshot has no snaptime, skipping");
            continue;
        };

        if is_older_than(snaptime, older_than_days, now) {
            names.push(record.name.clone());
        }
    }

    names
}
