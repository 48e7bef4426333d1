use super::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project_with(models: &[(&str, &str)], config: &str) -> (TempDir, Project) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("strata.yml"), config).unwrap();
    fs::create_dir_all(temp.path().join("models")).unwrap();
    fs::create_dir_all(temp.path().join("sources")).unwrap();
    for (name, sql) in models {
        fs::write(
            temp.path().join("models").join(format!("{}.sql", name)),
            sql,
        )
        .unwrap();
    }
    let project = Project::load(temp.path()).unwrap();
    (temp, project)
}

#[test]
fn compile_substitutes_ref_markers() {
    let (_temp, project) = project_with(
        &[
            ("base", "select 1 as id"),
            ("derived", "select * from {{ ref('base') }}"),
        ],
        "name: t\n",
    );

    let compiled = compile_models(&project).unwrap();
    assert_eq!(compiled.len(), 2);
    let derived = &compiled[&ModelName::from("derived")];
    assert_eq!(derived.sql, "select * from \"base\"");
    assert_eq!(derived.dependencies, vec!["base"]);
    assert_eq!(derived.relation, "derived");
    assert_eq!(derived.quoted_relation, "\"derived\"");
}

#[test]
fn compile_substitutes_source_markers() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("strata.yml"), "name: t\n").unwrap();
    fs::create_dir_all(temp.path().join("models")).unwrap();
    fs::create_dir_all(temp.path().join("sources")).unwrap();
    fs::write(
        temp.path().join("sources").join("raw.yml"),
        "kind: sources\nname: raw\nschema: landing\ntables:\n  - name: orders\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("models").join("stg_orders.sql"),
        "select * from {{ source('raw', 'orders') }}",
    )
    .unwrap();
    let project = Project::load(temp.path()).unwrap();

    let compiled = compile_models(&project).unwrap();
    let stg = &compiled[&ModelName::from("stg_orders")];
    assert_eq!(stg.sql, "select * from \"landing\".\"orders\"");
    assert!(stg.dependencies.is_empty());
}

#[test]
fn project_schema_qualifies_relations() {
    let (_temp, project) = project_with(
        &[("orders", "select 1 as id")],
        "name: t\nschema: analytics\n",
    );

    let compiled = compile_models(&project).unwrap();
    let orders = &compiled[&ModelName::from("orders")];
    assert_eq!(orders.relation, "analytics.orders");
    assert_eq!(orders.quoted_relation, "\"analytics\".\"orders\"");
    assert_eq!(orders.schema.as_deref(), Some("analytics"));
}

#[test]
fn materialization_defaults_come_from_config() {
    let (_temp, project) = project_with(
        &[("orders", "select 1 as id")],
        "name: t\nmaterialization: table\n",
    );

    let compiled = compile_models(&project).unwrap();
    assert_eq!(
        compiled[&ModelName::from("orders")].materialization,
        Materialization::Table
    );
}
