//! End-to-end training runs: organization → SQLite → aggregation.

use chrono::{Duration, TimeZone, Utc};

use phishsim::report::{aggregate_individuals, aggregate_types_by_month};
use phishsim::{
    Cell, Organization, Outcome, ResultStore, ScriptedVariant, SimRng, SqliteStore,
    TrainingConfig, User, VariantKind, VariantWeight,
};

fn config(n_users: usize, n_simulations: usize) -> TrainingConfig {
    TrainingConfig {
        n_users,
        n_simulations,
        training_interval_days: 90,
        table: "e2e_results".to_string(),
        ..TrainingConfig::default()
    }
}

#[test]
fn trained_results_survive_persistence() {
    let config = config(25, 9);
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();

    let rows = org.result();
    assert_eq!(rows.len(), 25 * 9);
    assert!(rows.iter().all(|r| Outcome::is_valid_label(r.outcome().as_str())));

    let mut store = SqliteStore::in_memory().unwrap();
    assert_eq!(store.replace_results(&config.table, &rows).unwrap(), rows.len());
    assert_eq!(store.load_results(&config.table).unwrap(), rows);
}

#[test]
fn individual_report_matches_in_memory_histories() {
    let config = config(15, 10);
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();

    let mut store = SqliteStore::in_memory().unwrap();
    store.replace_results(&config.table, &org.result()).unwrap();
    let report = aggregate_individuals(&store, &config.table).unwrap();
    assert_eq!(report.len(), 15);

    for user in org.users() {
        let id = user.id().to_string();
        let row = (0..report.len())
            .find(|&i| report.get(i, "user_id").and_then(Cell::as_str) == Some(id.as_str()))
            .expect("every user has a report row");
        let count = |outcome: Outcome| {
            i64::try_from(user.history().iter().filter(|r| r.outcome() == outcome).count()).unwrap()
        };
        assert_eq!(report.get(row, "name").and_then(Cell::as_str), Some(user.name()));
        assert_eq!(report.get(row, "type").and_then(Cell::as_str), Some(user.user_type()));
        assert_eq!(report.get(row, "successes").and_then(Cell::as_i64), Some(count(Outcome::Success)));
        assert_eq!(report.get(row, "fails").and_then(Cell::as_i64), Some(count(Outcome::Fail)));
        assert_eq!(report.get(row, "misses").and_then(Cell::as_i64), Some(count(Outcome::Miss)));
    }

    let names: Vec<&str> = (0..report.len())
        .filter_map(|i| report.get(i, "name").and_then(Cell::as_str))
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[test]
fn monthly_report_is_chronological() {
    let config = TrainingConfig {
        training_interval_days: 365,
        ..config(8, 24)
    };
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();

    let mut store = SqliteStore::in_memory().unwrap();
    store.replace_results(&config.table, &org.result()).unwrap();
    let report = aggregate_types_by_month(&store, &config.table).unwrap();

    let dates: Vec<&str> = (0..report.len())
        .filter_map(|i| report.get(i, "date").and_then(Cell::as_str))
        .collect();
    assert_eq!(dates.len(), report.len());
    assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(dates.first().copied(), Some("2024-01"));

    let engaged: i64 = (0..report.len())
        .map(|i| {
            report.get(i, "successes").and_then(Cell::as_i64).unwrap_or(0)
                + report.get(i, "fails").and_then(Cell::as_i64).unwrap_or(0)
        })
        .sum();
    let expected: usize = org.users().iter().map(User::non_missed_completed_count).sum();
    assert_eq!(engaged, i64::try_from(expected).unwrap());
}

#[test]
fn single_user_scenario() {
    let script = ScriptedVariant::new(
        VariantKind::QuickLearner.label(),
        vec![Outcome::Success, Outcome::Success, Outcome::Fail],
    )
    .unwrap();
    let mut ann = User::with_rng(Box::new(script), SimRng::new(3));
    let first = Utc.with_ymd_and_hms(2024, 2, 5, 9, 0, 0).unwrap();
    for day in 0..3 {
        ann.complete_simulation(first + Duration::days(day)).unwrap();
    }

    let mut store = SqliteStore::in_memory().unwrap();
    store.replace_results("results", ann.history()).unwrap();

    let by_type = aggregate_types_by_month(&store, "results").unwrap();
    assert_eq!(
        by_type.rows,
        vec![vec![
            Cell::from("2024-02"),
            Cell::from("QuickLearner"),
            Cell::Integer(2),
            Cell::Integer(1),
        ]]
    );

    let by_user = aggregate_individuals(&store, "results").unwrap();
    assert_eq!(
        by_user.rows,
        vec![vec![
            Cell::Text(ann.id().to_string()),
            Cell::Text(ann.name().to_string()),
            Cell::from("QuickLearner"),
            Cell::Integer(2),
            Cell::Integer(1),
            Cell::Integer(0),
        ]]
    );

    assert_eq!(aggregate_individuals(&store, "results").unwrap(), by_user);
}

#[test]
fn reruns_replace_previous_results() {
    let small = config(3, 2);
    let large = config(6, 4);
    let mut store = SqliteStore::in_memory().unwrap();

    for cfg in [&large, &small] {
        let mut org = Organization::new(cfg).unwrap();
        org.do_training().unwrap();
        store.replace_results(&cfg.table, &org.result()).unwrap();
    }
    assert_eq!(store.row_count("e2e_results").unwrap(), 6);
}

#[test]
fn dummy_population_only_records_vocabulary() {
    let config = TrainingConfig {
        variants: vec![VariantWeight::new(VariantKind::Dummy, 1.0)],
        ..config(10, 30)
    };
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();
    let summary = org.summary();
    let dummy = &summary.by_type["Dummy"];
    assert_eq!(dummy.users, 10);
    assert_eq!(dummy.total(), 300);
    assert!(dummy.successes > 0 && dummy.misses > 0 && dummy.fails > 0);
}
