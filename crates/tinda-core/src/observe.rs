//! Optional metrics instrumentation for TindaTrack.
//!
//! When the `observe` feature is enabled, backup and restore outcomes emit
//! counters and histograms via the [`metrics`] crate. A downstream
//! application must install a metrics recorder to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

use std::time::Duration;

/// Record a backup attempt.
///
/// - `tindatrack.backup.total` – counter with `outcome` label (`ok` / `fail`)
/// - `tindatrack.backup.duration_seconds` – histogram
/// - `tindatrack.backup.size_bytes` – histogram, successful backups only
#[inline]
pub fn record_backup(duration: Duration, size_bytes: Option<u64>) {
    #[cfg(feature = "observe")]
    {
        let outcome = if size_bytes.is_some() { "ok" } else { "fail" };
        metrics::counter!("tindatrack.backup.total", "outcome" => outcome).increment(1);
        metrics::histogram!("tindatrack.backup.duration_seconds").record(duration.as_secs_f64());
        if let Some(size) = size_bytes {
            metrics::histogram!("tindatrack.backup.size_bytes").record(size as f64);
        }
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, size_bytes);
    }
}

/// Record a table that could not be read during a backup.
///
/// - `tindatrack.backup.table_read_failures_total` – counter with `table` label
#[inline]
pub fn record_table_read_failure(table: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("tindatrack.backup.table_read_failures_total", "table" => table)
            .increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = table;
    }
}

/// Record a restore attempt.
///
/// - `tindatrack.restore.total` – counter with `outcome` label
///   (`ok`, `malformed`, `schema_mismatch`, `checksum_mismatch`, `store_failure`)
/// - `tindatrack.restore.duration_seconds` – histogram
#[inline]
pub fn record_restore(duration: Duration, outcome: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("tindatrack.restore.total", "outcome" => outcome).increment(1);
        metrics::histogram!("tindatrack.restore.duration_seconds").record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, outcome);
    }
}
