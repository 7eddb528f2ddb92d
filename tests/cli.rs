//! The `nexus-cli` binary against a freshly written archive.

use std::process::Command;

use nexus_persistency::persist::{ArchiveWriter, EventWriter};
use nexus_persistency::SerializedEvent;

fn nexus_cli(args: &[&str]) -> (bool, String) {
    let out = Command::new(env!("CARGO_BIN_EXE_nexus-cli"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run nexus-cli");
    (out.status.success(), String::from_utf8_lossy(&out.stdout).into_owned())
}

#[test]
fn test_version_carries_build_stamp() {
    let (ok, stdout) = nexus_cli(&["version"]);
    assert!(ok);
    assert!(stdout.starts_with(&format!("nexus-cli {} (built ", env!("CARGO_PKG_VERSION"))), "{}", stdout);
    assert!(!stdout.contains("(built )"), "{}", stdout);
}

#[test]
fn test_info_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.nxevt");
    let mut writer = ArchiveWriter::create(&path).unwrap();
    writer.write_event(&SerializedEvent::new(0)).unwrap();
    writer.write_event(&SerializedEvent::new(1)).unwrap();
    writer.write_metadata("num_events", "2").unwrap();
    writer.close().unwrap();
    drop(writer);

    let (ok, stdout) = nexus_cli(&["info", path.to_str().unwrap()]);
    assert!(ok);
    assert!(stdout.contains("Closed:  yes"), "{}", stdout);
    assert!(stdout.contains("Run events: 2"), "{}", stdout);
    assert!(stdout.contains("Events:      2"), "{}", stdout);
}
