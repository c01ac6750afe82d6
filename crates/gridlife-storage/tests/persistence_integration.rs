use gridlife_core::{RngSource, SimulationConfig, WorldState};
use gridlife_storage::{EpochLog, RunHeader, SharedEpochLog};
use rand::{SeedableRng, rngs::SmallRng};
use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn recorded_run_round_trips_through_json() {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_micros();
    let path = std::env::temp_dir().join(format!(
        "gridlife_storage_test_{}_{}.json",
        std::process::id(),
        timestamp
    ));

    let config = SimulationConfig {
        size: 16,
        population: 12,
        food_units: 20,
        epochs: 5,
        rng_seed: Some(77),
        ..SimulationConfig::default()
    };
    let shared = SharedEpochLog::new(RunHeader::new(&config));
    {
        let mut world = WorldState::with_parts(
            config.clone(),
            Box::new(RngSource(SmallRng::seed_from_u64(77))),
            Box::new(shared.clone()),
        )
        .expect("world");
        world.populate().expect("populate");
        world.run().expect("run");
    }

    shared.write_json(&path).expect("write log");
    let loaded = EpochLog::read_json(&path).expect("read log");
    assert_eq!(loaded, shared.snapshot());
    assert_eq!(loaded.header.size, 16);
    assert_eq!(loaded.header.total_epochs, 5);
    assert_eq!(loaded.len(), 6);
    assert!(loaded.epochs[0].actions.is_empty());
    assert_eq!(loaded.epochs[0].population.len(), 12);
    for (expected, snapshot) in loaded.epochs.iter().enumerate() {
        assert_eq!(snapshot.epoch, expected as u64);
    }

    let _ = fs::remove_file(&path);
}

#[test]
fn missing_file_surfaces_io_error() {
    let path = std::env::temp_dir().join("gridlife_storage_missing_log.json");
    let _ = fs::remove_file(&path);
    assert!(matches!(
        EpochLog::read_json(&path),
        Err(gridlife_storage::StorageError::Io(_))
    ));
}
