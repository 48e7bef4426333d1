//! End-to-end tests against the sample project fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use strata_core::{ModelDag, ModelStatus, Project, RunManifest, Schedule};
use strata_db::{Connection, DuckDbBackend};
use tempfile::TempDir;

fn strata_bin() -> String {
    env!("CARGO_BIN_EXE_strata").to_string()
}

/// Run the strata binary and return (stdout, stderr, success).
fn run_strata(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(strata_bin())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute strata with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_project")
}

/// Copy the sample project into a tempdir so runs can write artifacts freely
fn copy_fixture() -> TempDir {
    copy_fixture_named("sample_project")
}

fn copy_fixture_named(name: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let from = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    copy_dir(&from, temp.path());
    temp
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// Create the landing.orders table the fixture's source points at
async fn seed_database(project_dir: &Path) {
    let db = DuckDbBackend::new(project_dir.join("strata.duckdb").to_str().unwrap()).unwrap();
    db.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS landing;\n\
         CREATE TABLE landing.orders (id INT, amount DECIMAL(10,2), updated_at TIMESTAMP);\n\
         INSERT INTO landing.orders VALUES\n\
           (1, 10.00, '2024-05-01 08:00:00'),\n\
           (2, 25.50, '2024-05-01 09:30:00'),\n\
           (3, 7.25, '2024-05-02 14:00:00');",
    )
    .await
    .unwrap();
}

#[test]
fn load_sample_project() {
    let project = Project::load(&fixture_dir()).unwrap();

    assert_eq!(project.config.name, "sample_project");
    assert_eq!(project.registry.len(), 3);
    assert!(project.registry.contains("stg_orders"));
    assert!(project.registry.contains("orders_enriched"));
    assert!(project.registry.contains("orders_daily"));
}

#[test]
fn schedule_orders_models_by_dependency() {
    let project = Project::load(&fixture_dir()).unwrap();
    let dag = ModelDag::build(&project.registry).unwrap();
    let schedule = Schedule::plan(&dag, None).unwrap();

    assert_eq!(
        schedule.batches,
        vec![
            vec!["stg_orders"],
            vec!["orders_enriched"],
            vec!["orders_daily"]
        ]
    );
}

#[test]
fn selection_pulls_in_ancestors() {
    let project = Project::load(&fixture_dir()).unwrap();
    let dag = ModelDag::build(&project.registry).unwrap();
    let schedule = Schedule::plan(&dag, Some(&["orders_enriched".to_string()])).unwrap();

    assert_eq!(
        schedule.batches,
        vec![vec!["stg_orders"], vec!["orders_enriched"]]
    );
}

#[test]
fn ls_lists_models_in_batch_order() {
    let fixture = fixture_dir();
    let (stdout, _stderr, success) = run_strata(&["ls", "-p", fixture.to_str().unwrap()]);

    assert!(success);
    let stg = stdout.find("stg_orders").unwrap();
    let enriched = stdout.find("orders_enriched").unwrap();
    let daily = stdout.find("orders_daily").unwrap();
    assert!(stg < enriched && enriched < daily);
    assert!(stdout.contains("(table)"));
}

#[test]
fn compile_writes_rendered_sql() {
    let temp = copy_fixture();
    let (stdout, _stderr, success) = run_strata(&["compile", "-p", temp.path().to_str().unwrap()]);

    assert!(success, "compile failed: {}", stdout);
    let compiled = temp.path().join("target/compiled");
    let stg = fs::read_to_string(compiled.join("stg_orders.sql")).unwrap();
    assert!(stg.contains("\"landing\".\"orders\""));
    assert!(!stg.contains("{{"));
    let daily = fs::read_to_string(compiled.join("orders_daily.sql")).unwrap();
    assert!(daily.contains("\"orders_enriched\""));
}

#[tokio::test]
async fn run_builds_all_models_and_saves_manifest() {
    let temp = copy_fixture();
    seed_database(temp.path()).await;

    let (stdout, stderr, success) = run_strata(&["run", "-p", temp.path().to_str().unwrap()]);
    assert!(success, "run failed\nstdout: {}\nstderr: {}", stdout, stderr);
    assert!(stdout.contains("3 succeeded, 0 failed"));

    let manifest = RunManifest::load(&temp.path().join("target/manifest.json"))
        .unwrap()
        .unwrap();
    assert_eq!(manifest.count(ModelStatus::Succeeded), 3);
    assert!(manifest.finished_at.is_some());

    let db = DuckDbBackend::new(temp.path().join("strata.duckdb").to_str().unwrap()).unwrap();
    assert!(db.relation_exists("orders_enriched").await.unwrap());
    assert_eq!(
        db.query_count("SELECT * FROM orders_daily").await.unwrap(),
        2
    );
}

#[tokio::test]
async fn run_with_selection_builds_only_the_closure() {
    let temp = copy_fixture();
    seed_database(temp.path()).await;

    let (stdout, _stderr, success) = run_strata(&[
        "run",
        "-p",
        temp.path().to_str().unwrap(),
        "--select",
        "orders_enriched",
    ]);
    assert!(success, "run failed: {}", stdout);

    let db = DuckDbBackend::new(temp.path().join("strata.duckdb").to_str().unwrap()).unwrap();
    assert!(db.relation_exists("orders_enriched").await.unwrap());
    assert!(!db.relation_exists("orders_daily").await.unwrap());
}

#[test]
fn run_with_unknown_selection_fails() {
    let temp = copy_fixture();
    let (_stdout, stderr, success) = run_strata(&[
        "run",
        "-p",
        temp.path().to_str().unwrap(),
        "--select",
        "no_such_model",
    ]);

    assert!(!success);
    assert!(stderr.contains("no_such_model"));
}

#[tokio::test]
async fn run_collapses_duplicate_keys_to_one_staging_row() {
    let temp = copy_fixture_named("dedup_project");

    // Three order ids, two of them delivered twice with a later version
    let db = DuckDbBackend::new(temp.path().join("strata.duckdb").to_str().unwrap()).unwrap();
    db.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS landing;\n\
         CREATE TABLE landing.orders_raw (id INT, amount DECIMAL(10,2), updated_at TIMESTAMP);\n\
         INSERT INTO landing.orders_raw VALUES\n\
           (1, 10.00, '2024-05-01 08:00:00'),\n\
           (1, 12.00, '2024-05-02 08:00:00'),\n\
           (2, 5.00, '2024-05-01 09:00:00'),\n\
           (2, 6.50, '2024-05-03 09:00:00'),\n\
           (3, 7.25, '2024-05-02 14:00:00');",
    )
    .await
    .unwrap();
    drop(db);

    let (stdout, stderr, success) = run_strata(&["run", "-p", temp.path().to_str().unwrap()]);
    assert!(success, "run failed\nstdout: {}\nstderr: {}", stdout, stderr);

    let db = DuckDbBackend::new(temp.path().join("strata.duckdb").to_str().unwrap()).unwrap();
    assert_eq!(
        db.query_count("SELECT * FROM stg_orders_dedup").await.unwrap(),
        3
    );
    assert_eq!(
        db.query_count("SELECT id FROM stg_orders_dedup GROUP BY id HAVING COUNT(*) > 1")
            .await
            .unwrap(),
        0
    );
    // Latest version per key wins
    assert_eq!(
        db.query_count("SELECT * FROM stg_orders_dedup WHERE id = 1 AND amount = 12.00")
            .await
            .unwrap(),
        1
    );
}

#[test]
fn run_against_missing_source_table_fails_and_skips_dependents() {
    // Database never seeded: stg_orders fails, downstream models skip.
    let temp = copy_fixture();
    let (stdout, _stderr, success) = run_strata(&["run", "-p", temp.path().to_str().unwrap()]);

    assert!(!success);
    assert!(stdout.contains("0 succeeded, 1 failed, 2 skipped"));

    let manifest = RunManifest::load(&temp.path().join("target/manifest.json"))
        .unwrap()
        .unwrap();
    assert_eq!(manifest.status("stg_orders"), Some(ModelStatus::Failed));
    assert_eq!(
        manifest.status("orders_enriched"),
        Some(ModelStatus::Skipped)
    );
    assert_eq!(manifest.status("orders_daily"), Some(ModelStatus::Skipped));
}
