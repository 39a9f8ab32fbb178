//! Tests for LogRecovery
//!
//! These tests verify:
//! - Missing and empty logs
//! - Replay from the start and from a snapshot position
//! - Malformed lines are skipped
//! - Truncated tails are ignored and trimmed
//! - Stale logs are not replayed
//! - Verify mode leaves the file alone

use std::fs;
use std::path::PathBuf;

use remotelist::store::Lists;
use remotelist::wal::{LogHeader, LogPosition, LogRecord, LogRecovery, LogWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("operations.log");
    (temp_dir, log_path)
}

fn write_records(path: &PathBuf, generation: u64, records: &[LogRecord]) -> LogWriter {
    let mut writer = LogWriter::create(path, generation).unwrap();
    for record in records {
        writer.append(record).unwrap();
    }
    writer
}

// =============================================================================
// Empty / Missing Tests
// =============================================================================

#[test]
fn test_recover_missing_file() {
    let (_temp, path) = setup_temp_log();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.generation, None);
    assert_eq!(result.records_replayed(), 0);
    assert_eq!(lists.list_count(), 0);
    assert!(!path.exists());
}

#[test]
fn test_recover_empty_file() {
    let (_temp, path) = setup_temp_log();
    fs::File::create(&path).unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.generation, None);
    assert!(!result.was_truncated);
    assert_eq!(lists.list_count(), 0);
}

// =============================================================================
// Replay Tests
// =============================================================================

#[test]
fn test_replay_whole_log() {
    let (_temp, path) = setup_temp_log();
    write_records(
        &path,
        1,
        &[
            LogRecord::append("A", 10),
            LogRecord::append("A", 20),
            LogRecord::append("B", 100),
            LogRecord::remove("A"),
        ],
    );
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.generation, Some(1));
    assert_eq!(result.records_applied, 4);
    assert_eq!(result.lines_skipped, 0);
    assert_eq!(lists.size("A"), 1);
    assert_eq!(lists.get("A", 0).unwrap(), 10);
    assert_eq!(lists.get("B", 0).unwrap(), 100);
}

#[test]
fn test_replay_from_snapshot_offset() {
    let (_temp, path) = setup_temp_log();
    let mut writer = write_records(&path, 2, &[LogRecord::append("A", 1)]);
    let cut = writer.position();
    writer.append(&LogRecord::append("A", 2)).unwrap();
    drop(writer);

    // State as of the cut, as a snapshot would hold it
    let mut lists = Lists::new();
    lists.append("A", 1);

    let result = LogRecovery::replay(&path, &mut lists, cut).unwrap();

    assert_eq!(result.start_offset, cut.offset);
    assert_eq!(result.records_applied, 1);
    assert_eq!(lists.size("A"), 2);
    assert_eq!(lists.get("A", 1).unwrap(), 2);
}

#[test]
fn test_newer_generation_replays_from_start() {
    let (_temp, path) = setup_temp_log();
    write_records(&path, 5, &[LogRecord::append("A", 1), LogRecord::append("A", 2)]);
    let mut lists = Lists::new();

    // Snapshot was taken in generation 4; its offset means nothing here
    let result = LogRecovery::replay(&path, &mut lists, LogPosition::new(4, 9999)).unwrap();

    assert_eq!(result.records_applied, 2);
    assert_eq!(result.start_offset, LogHeader::new(5).encode().len() as u64);
    assert_eq!(lists.size("A"), 2);
}

#[test]
fn test_stale_log_is_not_replayed() {
    let (_temp, path) = setup_temp_log();
    write_records(&path, 1, &[LogRecord::append("A", 1)]);
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::new(3, 10)).unwrap();

    assert!(result.stale);
    assert_eq!(result.records_replayed(), 0);
    assert_eq!(lists.list_count(), 0);
}

#[test]
fn test_log_shorter_than_snapshot_offset_is_stale() {
    let (_temp, path) = setup_temp_log();
    write_records(&path, 2, &[LogRecord::append("A", 1)]);
    let len = fs::metadata(&path).unwrap().len();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::new(2, len + 50)).unwrap();

    assert!(result.stale);
    assert_eq!(result.records_replayed(), 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), len);
}

#[test]
fn test_legacy_headerless_log() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "APPEND:listaA:10\nAPPEND:listaA:20\nREMOVE:listaA\n").unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.generation, Some(0));
    assert_eq!(result.records_applied, 3);
    assert_eq!(lists.size("listaA"), 1);
}

#[test]
fn test_remove_on_empty_during_replay_is_ignored() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "REMOVE:A\nAPPEND:A:1\nREMOVE:A\nREMOVE:A\nAPPEND:A:2\n").unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.records_applied, 3);
    assert_eq!(result.records_ignored, 2);
    assert_eq!(lists.size("A"), 1);
    assert_eq!(lists.get("A", 0).unwrap(), 2);
}

// =============================================================================
// Damaged Log Tests
// =============================================================================

#[test]
fn test_malformed_lines_are_skipped() {
    let (_temp, path) = setup_temp_log();
    fs::write(
        &path,
        "APPEND:A:1\nnot a record\nAPPEND:A\nDELETE:A\nAPPEND:A:2\n",
    )
    .unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert_eq!(result.records_applied, 2);
    assert_eq!(result.lines_skipped, 3);
    assert_eq!(lists.size("A"), 2);
}

#[test]
fn test_truncated_tail_is_ignored_and_trimmed() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "APPEND:A:1\nAPPEND:A:2\nAPPEND:A:12").unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();

    assert!(result.was_truncated);
    assert_eq!(result.records_applied, 2);
    assert_eq!(lists.size("A"), 2);
    assert_eq!(lists.get("A", 1).unwrap(), 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "APPEND:A:1\nAPPEND:A:2\n");
}

#[test]
fn test_appends_after_trim_start_on_clean_line() {
    let (_temp, path) = setup_temp_log();
    let header = LogHeader::new(1).encode();
    fs::write(&path, format!("{}APPEND:A:1\nAPPE", header)).unwrap();
    let mut lists = Lists::new();

    let result = LogRecovery::replay(&path, &mut lists, LogPosition::default()).unwrap();
    let mut writer = LogWriter::open(&path, result.generation.unwrap()).unwrap();
    writer.append(&LogRecord::append("B", 5)).unwrap();
    drop(writer);

    let mut replayed = Lists::new();
    let again = LogRecovery::replay(&path, &mut replayed, LogPosition::default()).unwrap();

    assert!(!again.was_truncated);
    assert_eq!(again.lines_skipped, 0);
    assert_eq!(replayed.size("A"), 1);
    assert_eq!(replayed.size("B"), 1);
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, path) = setup_temp_log();
    let contents = "APPEND:A:1\njunk\nAPPEND:A:2";
    fs::write(&path, contents).unwrap();

    let result = LogRecovery::verify(&path, LogPosition::default()).unwrap();

    assert_eq!(result.records_applied, 1);
    assert_eq!(result.lines_skipped, 1);
    assert!(result.was_truncated);
    assert_eq!(result.valid_len, "APPEND:A:1\njunk\n".len() as u64);
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}
