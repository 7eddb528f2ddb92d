//! Writing events through the persistency manager and reading them back.

use nexus_persistency::event::{HitCollection, IonizationHit, PmtHit};
use nexus_persistency::persist::{ArchiveWriter, EventArchive, EventWriter, PersistencyConfig, PersistencyManager};
use nexus_persistency::track::{ParticleDefinition, TrackFinish, TrackRecord, TrackStart, TrackingAction};
use nexus_persistency::util::units::MeV;
use nexus_persistency::util::{DVec3, Vertex};
use nexus_persistency::{Error, SerializedEvent};

use tempfile::{tempdir, NamedTempFile};

fn records(event_id: i64) -> Vec<TrackRecord> {
    let mut action = TrackingAction::new();
    action.begin_event(event_id);
    let origin = Vertex::default();
    action
        .on_track_start(&TrackStart::primary(1, ParticleDefinition::electron(), origin, 2.0 * MeV, DVec3::Z, "ACTIVE"))
        .unwrap();
    action
        .on_track_start(&TrackStart::secondary(2, 1, "eIoni", ParticleDefinition::electron(), origin, 0.1 * MeV, DVec3::X, "ACTIVE"))
        .unwrap();
    for id in [2, 1] {
        action
            .on_track_finish(&TrackFinish::new(id, Vertex::new(DVec3::new(0.0, 0.0, 5.0), 1.0), DVec3::ZERO, 5.0, "ACTIVE"))
            .unwrap();
    }
    action.end_event()
}

fn collections() -> Vec<HitCollection> {
    let mut pmt = PmtHit::new(3, DVec3::new(0.0, 0.0, -100.0), 25.0).unwrap();
    for t in [10.0, 12.0, 30.0, 80.0] {
        pmt.fill(t);
    }
    let deposits = (0..50)
        .map(|i| IonizationHit::new(1 + i % 2, DVec3::new(0.0, 0.0, i as f64 * 0.1), i as f64, 0.001))
        .collect();
    vec![HitCollection::ionization("ACTIVE", deposits), HitCollection::pmt("PMT", vec![pmt])]
}

fn config_for(path: &std::path::Path) -> PersistencyConfig {
    let mut config = PersistencyConfig::default();
    config.output_file = Some(path.to_path_buf());
    config.history_file = path.with_extension("missing");
    config
}

#[test]
fn test_roundtrip_events() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let manager = PersistencyManager::new(config_for(temp.path()));
    manager.open().unwrap();

    let mut written: Vec<SerializedEvent> = Vec::new();
    for id in 0..3 {
        assert!(manager.store_event(id, &records(id), &collections()).unwrap());
        written.push(nexus_persistency::assemble(id, &records(id), &collections(), &manager.config().store_options()).unwrap());
    }
    manager.store_run(3).unwrap();
    manager.close_file().unwrap();
    assert_eq!(manager.events_written(), 3);

    let archive = EventArchive::open(temp.path()).expect("Failed to open archive");
    assert!(archive.is_frozen());
    assert_eq!(archive.num_events(), 3);
    assert_eq!(archive.metadata().num_events(), Some(3));

    let read: Vec<SerializedEvent> = archive.events().collect::<Result<_, _>>().unwrap();
    assert_eq!(read, written);
    assert_eq!(archive.event_by_id(2).unwrap().event_id, 2);
    assert!(matches!(archive.event_by_id(42), Err(Error::NotFound(_))));

    let evt = &read[1];
    assert_eq!(evt.particles.len(), 2);
    assert_eq!(evt.tracks.len(), 2);
    assert_eq!(evt.sensor_hits[0].amplitude, 4);
}

#[test]
fn test_compressed_archive() {
    let dir = tempdir().unwrap();
    let plain_path = dir.path().join("plain.nxevt");
    let packed_path = dir.path().join("packed.nxevt");

    for (path, level) in [(&plain_path, -1), (&packed_path, 9)] {
        let mut writer = ArchiveWriter::create(path).unwrap().with_compression(level);
        let event = nexus_persistency::assemble(0, &records(0), &collections(), &Default::default()).unwrap();
        writer.write_event(&event).unwrap();
        writer.write_metadata("num_events", "1").unwrap();
        writer.close().unwrap();
    }

    let plain_len = std::fs::metadata(&plain_path).unwrap().len();
    let packed_len = std::fs::metadata(&packed_path).unwrap().len();
    assert!(packed_len < plain_len, "{} >= {}", packed_len, plain_len);

    let plain = EventArchive::open(&plain_path).unwrap();
    let packed = EventArchive::open(&packed_path).unwrap();
    assert_eq!(plain.event(0).unwrap(), packed.event(0).unwrap());
    assert_eq!(packed.metadata().num_events(), Some(1));
}

#[test]
fn test_history_file_metadata() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("run.nxevt");
    let history = dir.path().join("G4history.macro");
    std::fs::write(
        &history,
        "/run/initialize\n/Generator/SingleParticle/particle e-\n/nexus/persistency/outputFile run.nxevt\n",
    )
    .unwrap();

    let mut config = config_for(&out);
    config.history_file = history;
    let manager = PersistencyManager::new(config);
    manager.open().unwrap();
    manager.store_run(0).unwrap();
    manager.close_file().unwrap();

    let archive = EventArchive::open(&out).unwrap();
    let meta = archive.metadata();
    assert_eq!(meta.get("/Generator/SingleParticle/particle"), Some("e-"));
    assert_eq!(meta.get("/nexus/persistency/outputFile"), Some("run.nxevt"));
    assert_eq!(meta.get("/run/initialize"), Some(""));
    assert_eq!(meta.num_events(), Some(0));
    assert_eq!(archive.num_events(), 0);
}

#[test]
fn test_second_open_keeps_first_file() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.nxevt");
    let second = dir.path().join("second.nxevt");

    let manager = PersistencyManager::new(config_for(&first));
    manager.open_file(&first).unwrap();
    manager.open_file(&second).unwrap();
    assert!(!second.exists());

    manager.store_event(1, &records(1), &[]).unwrap();
    manager.close_file().unwrap();
    assert_eq!(EventArchive::open(&first).unwrap().num_events(), 1);
}

#[test]
fn test_output_command_opens_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("cmd.nxevt");

    let mut manager = PersistencyManager::new(PersistencyConfig::default());
    manager.apply_command("/nexus/persistency/StoreTrajectories false").unwrap();
    manager
        .apply_command(&format!("/nexus/persistency/outputFile {}", out.display()))
        .unwrap();
    assert!(manager.is_open());

    manager.store_event(0, &records(0), &[]).unwrap();
    manager.close_file().unwrap();
    let evt = EventArchive::open(&out).unwrap().event(0).unwrap();
    assert!(evt.particles.is_empty());
}

#[test]
fn test_unwritable_output() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("no_such_dir").join("out.nxevt");

    let manager = PersistencyManager::new(config_for(&bad));
    match manager.open() {
        Err(Error::OutputUnavailable { path, .. }) => assert_eq!(path, bad),
        other => panic!("expected OutputUnavailable, got {:?}", other.err()),
    }
    assert!(!manager.is_open());
}
