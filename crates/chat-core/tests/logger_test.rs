//! Integration test for init_tracing. Lives in its own test binary because the global
//! subscriber can only be installed once per process.

use chat_core::init_tracing;

/// **Test: Missing parent directories are created and events reach the log file.**
#[test]
fn test_init_tracing_creates_log_directories() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("nested").join("datachat.log");
    assert!(!log_path.parent().unwrap().exists());

    init_tracing(log_path.to_str().unwrap()).unwrap();
    assert!(log_path.parent().unwrap().is_dir());
    assert!(log_path.is_file());

    tracing::error!(conversation_id = "c-1", "dataset rehydration failed");
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("dataset rehydration failed"));
    assert!(contents.contains("c-1"));

    let second = init_tracing(log_path.to_str().unwrap());
    assert!(second.is_err());
}
