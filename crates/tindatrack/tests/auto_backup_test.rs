//! Daily automatic backup: owner gating, once-per-day marker, periodic loop.

use chrono::NaiveDate;
use std::time::Duration;
use tempfile::TempDir;
use tindatrack::prelude::*;
use tindatrack::{MarkerFile, SkipReason, AUTO_BACKUP_LABEL};

fn setup() -> (TempDir, TindaDb, DailyBackup<SqliteDomainStore, SqliteAuditLog>) {
    let dir = TempDir::new().unwrap();
    let db = TindaDb::open(dir.path().join("shop.db")).unwrap();
    db.store()
        .insert_rows(
            TableName::Categories,
            &[row! { "category_id" => 1, "name" => "Drinks" }],
        )
        .unwrap();
    let daily = DailyBackup::new(db.engine().clone(), dir.path().join("backups"));
    (dir, db, daily)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

#[test]
fn test_only_owners_trigger_backups() {
    let (_dir, db, daily) = setup();
    let cashier = Actor::new(2, "bob", "cashier");

    let outcome = daily.run_if_due_on(&cashier, day(16)).unwrap();
    assert_eq!(outcome, AutoBackupOutcome::Skipped(SkipReason::NotOwner));
    assert_eq!(db.audit().count().unwrap(), 0);
    assert!(!daily.export_dir().exists());
}

#[test]
fn test_runs_once_per_day() {
    let (_dir, db, daily) = setup();
    let owner = Actor::new(1, "alice", "Owner");

    let path = match daily.run_if_due_on(&owner, day(16)).unwrap() {
        AutoBackupOutcome::Created { path, size_bytes } => {
            assert_eq!(std::fs::metadata(&path).unwrap().len(), size_bytes);
            path
        }
        other => panic!("expected a backup, got {:?}", other),
    };
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("TindaTrack_Backup_Automatic_Daily_Backup_"));

    let again = daily.run_if_due_on(&owner, day(16)).unwrap();
    assert_eq!(
        again,
        AutoBackupOutcome::Skipped(SkipReason::AlreadyRanToday(day(16)))
    );

    let next_day = daily.run_if_due_on(&owner, day(17)).unwrap();
    assert!(matches!(next_day, AutoBackupOutcome::Created { .. }));

    let records = db.audit().recent(10).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.action == ActionKind::BackupCreated
            && r.label.as_deref() == Some(AUTO_BACKUP_LABEL)));

    let marker = MarkerFile::new(daily.export_dir()).read().unwrap().unwrap();
    assert_eq!(marker.date, day(17));
}

#[test]
fn test_written_export_restores() {
    let (_dir, db, daily) = setup();
    let owner = Actor::new(1, "alice", "owner");

    let AutoBackupOutcome::Created { path, .. } = daily.run_if_due_on(&owner, day(16)).unwrap()
    else {
        panic!("expected a backup");
    };

    db.store()
        .insert_rows(
            TableName::Categories,
            &[row! { "category_id" => 2, "name" => "Snacks" }],
        )
        .unwrap();

    db.engine().restore_from_file(&path, 1, Some("alice")).unwrap();
    assert_eq!(db.store().count(TableName::Categories).unwrap(), 1);
}

#[test]
fn test_corrupt_marker_does_not_block_backup() {
    let (_dir, _db, daily) = setup();
    std::fs::create_dir_all(daily.export_dir()).unwrap();
    std::fs::write(daily.export_dir().join(MarkerFile::FILENAME), "garbage").unwrap();

    let outcome = daily
        .run_if_due_on(&Actor::new(1, "alice", "owner"), day(16))
        .unwrap();
    assert!(matches!(outcome, AutoBackupOutcome::Created { .. }));
}

#[tokio::test]
async fn test_periodic_loop_backs_up_and_stops() {
    let (_dir, db, daily) = setup();
    let daily = Arc::new(daily);
    let shutdown = ShutdownHandle::new();

    let task = tokio::spawn(daily.clone().run_periodic(
        Actor::new(1, "alice", "owner"),
        Duration::from_millis(20),
        shutdown.subscribe(),
    ));

    // First tick fires immediately; later ticks on the same day are skipped
    tokio::time::sleep(Duration::from_millis(150)).await;
    shutdown.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(db.audit().count().unwrap(), 1);
    assert!(MarkerFile::new(daily.export_dir()).read().unwrap().is_some());
}

#[tokio::test]
async fn test_zero_period_is_raised_to_minimum() {
    let (_dir, db, daily) = setup();
    let shutdown = ShutdownHandle::new();

    let task = tokio::spawn(Arc::new(daily).run_periodic(
        Actor::new(1, "alice", "owner"),
        Duration::ZERO,
        shutdown.subscribe(),
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(db.audit().count().unwrap(), 1);
}
