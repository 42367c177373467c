//! Seeded runs are reproducible end to end.

use phishsim::report::{export_reports, INDIVIDUALS_CSV, TYPES_CSV};
use phishsim::{Organization, ResultStore, SqliteStore, TrainingConfig};

fn run(config: &TrainingConfig) -> (Organization, SqliteStore) {
    let mut org = Organization::new(config).unwrap();
    org.do_training().unwrap();
    let mut store = SqliteStore::in_memory().unwrap();
    store.replace_results(&config.table, &org.result()).unwrap();
    (org, store)
}

#[test]
fn same_seed_same_exports() {
    let config = TrainingConfig {
        n_users: 30,
        n_simulations: 12,
        seed: 2024,
        ..TrainingConfig::default()
    };

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let (org_a, store_a) = run(&config);
    let (org_b, store_b) = run(&config);
    assert_eq!(org_a.fingerprint(), org_b.fingerprint());

    export_reports(&store_a, &config.table, first.path()).unwrap();
    export_reports(&store_b, &config.table, second.path()).unwrap();

    for file in [TYPES_CSV, INDIVIDUALS_CSV] {
        let a = std::fs::read_to_string(first.path().join(file)).unwrap();
        let b = std::fs::read_to_string(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between identical runs");
    }
}

#[test]
fn exports_have_expected_headers() {
    let config = TrainingConfig {
        n_users: 4,
        n_simulations: 3,
        ..TrainingConfig::default()
    };
    let (_, store) = run(&config);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("reports");

    let exported = export_reports(&store, &config.table, &out).unwrap();
    let types = std::fs::read_to_string(&exported.types).unwrap();
    let individuals = std::fs::read_to_string(&exported.individuals).unwrap();
    assert!(types.starts_with("date,type,successes,fails\n"));
    assert!(individuals.starts_with("user_id,name,type,successes,fails,misses\n"));
    assert_eq!(individuals.lines().count(), 5);
}

#[test]
fn file_database_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        n_users: 5,
        n_simulations: 5,
        database: dir.path().join("phishsim.db"),
        ..TrainingConfig::default()
    };
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();
    {
        let mut store = SqliteStore::open(&config.database).unwrap();
        store.replace_results(&config.table, &org.result()).unwrap();
    }
    let store = SqliteStore::open(&config.database).unwrap();
    assert_eq!(store.load_results(&config.table).unwrap(), org.result());
}
