use super::*;

fn model_map(pairs: &[(&str, &str)]) -> HashMap<ModelName, String> {
    pairs
        .iter()
        .map(|(k, v)| (ModelName::new(*k), v.to_string()))
        .collect()
}

fn source_map(entries: &[(&str, &str, &str)]) -> HashMap<(SourceName, String), String> {
    entries
        .iter()
        .map(|(g, t, v)| ((SourceName::new(*g), t.to_string()), v.to_string()))
        .collect()
}

#[test]
fn extract_model_refs() {
    let sql = "select * from {{ ref('stg_orders') }} o join {{ ref('stg_customers') }} c using (customer_id)";
    let refs = extract(sql);
    assert_eq!(refs.models, vec!["stg_orders", "stg_customers"]);
    assert!(refs.sources.is_empty());
}

#[test]
fn extract_source_refs() {
    let sql = "select * from {{ source('raw', 'orders') }}";
    let refs = extract(sql);
    assert!(refs.models.is_empty());
    assert_eq!(
        refs.sources,
        vec![(SourceName::new("raw"), "orders".to_string())]
    );
}

#[test]
fn extract_deduplicates() {
    let sql = "select * from {{ ref('a') }} union all select * from {{ ref('a') }}";
    let refs = extract(sql);
    assert_eq!(refs.models, vec!["a"]);
}

#[test]
fn extract_tolerates_spacing_and_quotes() {
    let sql = r#"select * from {{ref("stg_orders")}} join {{  source( 'raw' , 'orders' )  }}"#;
    let refs = extract(sql);
    assert_eq!(refs.models, vec!["stg_orders"]);
    assert_eq!(
        refs.sources,
        vec![(SourceName::new("raw"), "orders".to_string())]
    );
}

#[test]
fn invalid_marker_detected() {
    assert!(find_invalid_marker("select {{ config(x=1) }} from t").is_some());
    assert!(find_invalid_marker("select * from {{ ref('a') }}").is_none());
    assert!(find_invalid_marker("select 1").is_none());
}

#[test]
fn render_substitutes_relations() {
    let models = model_map(&[("stg_orders", r#""analytics"."stg_orders""#)]);
    let sources = source_map(&[("raw", "orders", r#""raw"."orders""#)]);

    let sql = "select * from {{ ref('stg_orders') }} union all select * from {{ source('raw', 'orders') }}";
    let rendered = render("fct_orders", sql, &models, &sources).unwrap();
    assert_eq!(
        rendered,
        r#"select * from "analytics"."stg_orders" union all select * from "raw"."orders""#
    );
}

#[test]
fn render_fails_on_unknown_model() {
    let result = render(
        "fct_orders",
        "select * from {{ ref('missing') }}",
        &HashMap::new(),
        &HashMap::new(),
    );
    assert!(matches!(
        result,
        Err(CoreError::UnresolvedReference { model, reference })
            if model == "fct_orders" && reference == "missing"
    ));
}

#[test]
fn render_fails_on_unknown_source() {
    let result = render(
        "stg_orders",
        "select * from {{ source('raw', 'orders') }}",
        &HashMap::new(),
        &HashMap::new(),
    );
    assert!(matches!(result, Err(CoreError::UnresolvedSource { .. })));
}

#[test]
fn watermark_predicate_wraps_query() {
    let sql = apply_watermark_predicate("select id, updated_at from t;", "updated_at", "2024-06-01");
    assert_eq!(
        sql,
        r#"SELECT * FROM (select id, updated_at from t) AS watermark_window WHERE "updated_at" > '2024-06-01'"#
    );
}

#[test]
fn watermark_predicate_escapes_literal() {
    let sql = apply_watermark_predicate("select 1", "k", "o'clock");
    assert!(sql.ends_with(r#""k" > 'o''clock'"#));
}
