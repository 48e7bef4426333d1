//! SQL identifier quoting and literal escaping
//!
//! The engine emits complete SQL statements built from user-controlled
//! names; everything interpolated into a statement goes through one of
//! these helpers.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and doubles any embedded double
/// quotes, per the SQL standard.
///
/// # Examples
/// ```
/// use strata_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("orders"), r#""orders""#);
/// assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified relation name (e.g. `staging.orders`).
///
/// Each dot-separated component is quoted individually.
///
/// # Examples
/// ```
/// use strata_core::sql_utils::quote_relation;
/// assert_eq!(quote_relation("orders"), r#""orders""#);
/// assert_eq!(quote_relation("staging.orders"), r#""staging"."orders""#);
/// ```
pub fn quote_relation(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a value as a single-quoted SQL string literal, doubling any
/// embedded single quotes.
///
/// # Examples
/// ```
/// use strata_core::sql_utils::string_literal;
/// assert_eq!(string_literal("2024-01-01"), "'2024-01-01'");
/// assert_eq!(string_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_plain() {
        assert_eq!(quote_ident("orders"), r#""orders""#);
    }

    #[test]
    fn quote_ident_embedded_quote() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn quote_ident_dot_is_not_special() {
        assert_eq!(quote_ident("schema.table"), r#""schema.table""#);
    }

    #[test]
    fn quote_relation_unqualified() {
        assert_eq!(quote_relation("orders"), r#""orders""#);
    }

    #[test]
    fn quote_relation_qualified() {
        assert_eq!(quote_relation("staging.orders"), r#""staging"."orders""#);
        assert_eq!(
            quote_relation("db.staging.orders"),
            r#""db"."staging"."orders""#
        );
    }

    #[test]
    fn string_literal_escapes_quotes() {
        assert_eq!(string_literal("plain"), "'plain'");
        assert_eq!(string_literal("it's"), "'it''s'");
    }
}
