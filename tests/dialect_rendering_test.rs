use rustf_sql::prelude::*;
use rustf_sql::query_builder::dialects::escape;

fn paren_depth_ok(sql: &str) -> bool {
    let mut depth = 0i64;
    for c in sql.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// LIKE semantics with a backslash escape, enough to evaluate bound patterns
fn like_matches(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('%') => (0..=t.len()).any(|i| matches(&p[1..], &t[i..])),
            Some('_') => !t.is_empty() && matches(&p[1..], &t[1..]),
            Some('\\') if p.len() > 1 => t.first() == Some(&p[1]) && matches(&p[2..], &t[1..]),
            Some(c) => t.first() == Some(c) && matches(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    matches(&p, &t)
}

fn contains_patterns(expression: &Expression) -> Vec<String> {
    let dialect = SqlDialect::new(DatabaseBackend::Postgres);
    compile_where(&dialect, expression)
        .unwrap()
        .unwrap()
        .values()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn row(pairs: &[(&str, SqlValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_deep_trees_render_balanced_on_every_dialect() {
    let leaves: Vec<Expression> = (0..12)
        .map(|i| match i % 4 {
            0 => Expression::eq(format!("f{}", i), i),
            1 => Expression::starts_with(format!("f{}", i), "abc"),
            2 => Expression::not_in(format!("f{}", i), [1, 2]),
            _ => Expression::is_null(format!("f{}", i)),
        })
        .collect();
    let tree = Expression::or(
        Expression::list_to_nested_and(leaves.clone()).unwrap(),
        Expression::list_to_nested_or(leaves).unwrap(),
    );

    for backend in DatabaseBackend::ALL {
        let dialect = SqlDialect::new(backend);
        let statement = QueryBuilder::new(&dialect)
            .from("t")
            .filter(tree.clone())
            .build()
            .unwrap();

        assert!(paren_depth_ok(&statement.sql), "{}: {}", backend, statement.sql);
        assert_eq!(statement.sql.matches(" LIKE ").count(), 6);
    }
}

#[test]
fn test_contains_wildcard_set() {
    let dialect = SqlDialect::new(DatabaseBackend::Postgres);
    let statement = compile_where(&dialect, &Expression::contains("title", "rust"))
        .unwrap()
        .unwrap();

    assert_eq!(
        statement.sql,
        "WHERE (\"title\" LIKE $1 OR \"title\" LIKE $2 OR \"title\" LIKE $3)"
    );
    let patterns: Vec<&str> = statement.values().filter_map(|v| v.as_str()).collect();
    assert_eq!(patterns, vec!["%rust", "%rust%", "rust%"]);
}

#[test]
fn test_contains_patterns_match_substrings() {
    let patterns = contains_patterns(&Expression::contains("name", "bob"));
    let any_match = |text: &str| patterns.iter().any(|p| like_matches(p, text));

    for text in ["bob", "bobby", "abob", "jimbobjones"] {
        assert!(any_match(text), "{} should match", text);
    }
    assert!(!any_match("bo"));
    assert!(!any_match("b0b"));

    // a literal wildcard in the value only matches itself
    let patterns = contains_patterns(&Expression::contains("label", "50%_off"));
    let any_match = |text: &str| patterns.iter().any(|p| like_matches(p, text));
    assert!(any_match("save 50%_off today"));
    assert!(!any_match("save 500xoff today"));

    let patterns = contains_patterns(&Expression::contains_not("name", "bob"));
    assert!(patterns.iter().all(|p| !like_matches(p, "alice")));
    assert!(patterns.iter().any(|p| like_matches(p, "abob")));
}

#[test]
fn test_list_folding_identities() {
    assert!(Expression::list_to_nested_and(Vec::new()).is_none());

    let single = Expression::eq("a", 1);
    assert_eq!(
        Expression::list_to_nested_or(vec![single.clone()]),
        Some(single)
    );

    let folded = Expression::list_to_nested_and(vec![
        Expression::eq("a", 1),
        Expression::eq("b", 2),
        Expression::eq("c", 3),
    ])
    .unwrap();
    let manual = Expression::and(
        Expression::eq("a", 1),
        Expression::and(Expression::eq("b", 2), Expression::eq("c", 3)),
    );
    assert_eq!(folded, manual);
}

#[test]
fn test_pagination_tokens_per_dialect() {
    let expected = [
        (
            DatabaseBackend::SqlServer,
            "SELECT * FROM [t] ORDER BY [id] ASC OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY",
        ),
        (
            DatabaseBackend::MySQL,
            "SELECT * FROM `t` ORDER BY `id` ASC LIMIT 10,5",
        ),
        (
            DatabaseBackend::Postgres,
            "SELECT * FROM \"t\" ORDER BY \"id\" ASC OFFSET 10 LIMIT 5",
        ),
        (
            DatabaseBackend::SQLite,
            "SELECT * FROM \"t\" ORDER BY \"id\" ASC LIMIT 5 OFFSET 10",
        ),
    ];

    for (backend, sql) in expected {
        let dialect = SqlDialect::new(backend);
        let statement = QueryBuilder::new(&dialect)
            .from("t")
            .order_by(ResultOrder::asc("id"))
            .offset(10)
            .limit(5)
            .build()
            .unwrap();
        assert_eq!(statement.sql, sql);
    }
}

#[test]
fn test_schema_mismatch_reported_before_rendering() {
    let dialect = SqlDialect::new(DatabaseBackend::MySQL);
    let rows = vec![
        row(&[("a", SqlValue::Int(1))]),
        row(&[("a", SqlValue::Int(2))]),
        row(&[("a", SqlValue::Int(3)), ("b", SqlValue::Int(4))]),
    ];

    let err = QueryBuilder::new(&dialect)
        .from("t")
        .build_insert_multiple(&rows)
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { row: 2, .. }));
    assert_eq!(err.error_code(), "E_SCHEMA_MISMATCH");
}

#[test]
fn test_injection_attempts_stay_inside_literals() {
    let attacks = [
        "'; DROP TABLE users; --",
        "\\'; DROP TABLE users; /*",
        "x' OR '1'='1",
        "$q$; DROP TABLE users; $q$",
    ];

    for backend in DatabaseBackend::ALL {
        let dialect = SqlDialect::new(backend);
        for attack in attacks {
            let statement = QueryBuilder::new(&dialect)
                .from("users")
                .mode(RenderMode::Inline)
                .filter(Expression::eq("name", attack))
                .build()
                .unwrap();

            if backend == DatabaseBackend::Postgres {
                // Dollar-quoted: the value is carried verbatim between random tags
                assert!(statement.sql.contains(attack), "{}", statement.sql);
                assert!(statement.sql.starts_with("SELECT * FROM \"users\" WHERE (\"name\" = $q"));
            } else {
                assert!(!statement.sql.contains("--"), "{}: {}", backend, statement.sql);
                assert!(!statement.sql.contains("/*"), "{}: {}", backend, statement.sql);

                let literal = dialect.quote_string(attack);
                assert!(statement.sql.ends_with(&format!("= {})", literal)));
            }
        }
    }
}

#[test]
fn test_identifier_quoting_cannot_be_escaped() {
    assert_eq!(
        escape::quote_identifier(DatabaseBackend::SqlServer, "x]; DROP TABLE t; --"),
        "[x]]; DROP TABLE t; --]"
    );
    assert_eq!(
        escape::quote_identifier(DatabaseBackend::SQLite, "a\"b"),
        "\"a\"\"b\""
    );
}

#[test]
fn test_create_and_drop_round() {
    let columns = vec![
        Column::builder("id", DataType::Long).primary_key().build().unwrap(),
        Column::builder("payload", DataType::Blob).build().unwrap(),
        Column::builder("created_at", DataType::DateTime)
            .not_null()
            .build()
            .unwrap(),
    ];

    for backend in DatabaseBackend::ALL {
        let dialect = SqlDialect::new(backend);
        let schema = SchemaBuilder::new(&dialect);
        let sql = schema.create_table("events", &columns).unwrap();

        assert!(sql.starts_with("CREATE TABLE "));
        assert!(paren_depth_ok(&sql));
        assert_eq!(
            schema.drop_table("events"),
            format!("DROP TABLE IF EXISTS {}", dialect.quote_identifier("events"))
        );
    }
}

#[test]
fn test_exists_alias_per_dialect() {
    for backend in DatabaseBackend::ALL {
        let dialect = SqlDialect::new(backend);
        let statement = QueryBuilder::new(&dialect)
            .from("users")
            .filter(Expression::eq("email", "a@b.c"))
            .build_exists("present")
            .unwrap();

        let alias = dialect.quote_identifier("present");
        assert!(statement.sql.ends_with(&format!("AS {}", alias)));
        assert_eq!(statement.params.len(), 1);
    }
}
