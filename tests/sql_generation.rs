//! SQL generation across dialects, without a database.

mod common;

use common::{Multikey, Person};
use quarry::dialect::DialectKind;
use quarry::predicate::{self, Operator};
use quarry::query::{PlaceholderStyle, SqlGenerator};
use quarry::{Entity, QuarryError};
use sea_query::Value;

const ALL: [DialectKind; 5] = [
    DialectKind::Postgres,
    DialectKind::MySql,
    DialectKind::Sqlite,
    DialectKind::SqlServer,
    DialectKind::Oracle,
];

#[test]
fn quoting_is_idempotent_in_every_dialect() {
    for kind in ALL {
        let d = kind.dialect();
        for raw in ["foo", "Person", "  spaced  "] {
            let once = d.quote_string(raw);
            assert!(d.is_quoted(&once), "{kind}: {once}");
            assert_eq!(d.quote_string(&once), once, "{kind}");
        }
        assert_eq!(d.quote_string("*"), "*");
    }
}

#[test]
fn table_names_follow_dialect_quoting() {
    let pg = DialectKind::Postgres.dialect();
    assert_eq!(pg.get_table_name(Some("bar"), "foo", Some("al")).unwrap(), "\"bar\".\"foo\" AS \"al\"");

    let mssql = DialectKind::SqlServer.dialect();
    assert_eq!(mssql.get_table_name(Some("dbo"), "foo", None).unwrap(), "[dbo].[foo]");

    let mysql = DialectKind::MySql.dialect();
    assert_eq!(mysql.get_column_name(Some("foo"), "bar", None).unwrap(), "`foo`.`bar`");

    let oracle = DialectKind::Oracle.dialect();
    assert_eq!(oracle.get_table_name(None, "foo", Some("f")).unwrap(), "\"foo\" \"f\"");
}

#[test]
fn empty_names_are_rejected() {
    for kind in ALL {
        let d = kind.dialect();
        assert!(matches!(d.get_table_name(None, "  ", None), Err(QuarryError::Argument(_))));
        assert!(matches!(d.get_column_name(Some("t"), "", None), Err(QuarryError::Argument(_))));
    }
}

#[test]
fn and_group_joins_the_individual_fragments() {
    let generator = SqlGenerator::new(DialectKind::Postgres.dialect());
    let metadata = Person::metadata();
    let l1 = predicate::field("Active", Operator::Eq, true).unwrap();
    let l2 = predicate::field("LastName", Operator::Eq, "Smith").unwrap();

    let first = generator.compile_where(Some(&l1), metadata).unwrap();
    let second = generator.compile_where(Some(&l2), metadata).unwrap();
    let both = generator
        .compile_where(Some(&predicate::and(vec![l1, l2])), metadata)
        .unwrap();

    // The second fragment's parameter is renumbered in the shared set.
    assert_eq!(
        both.sql,
        format!(
            "({} AND {})",
            first.sql,
            second.sql.replace("@LastName_0", "@LastName_1")
        )
    );
    assert_eq!(both.parameters.get("Active_0"), Some(&Value::from(true)));
    assert_eq!(both.parameters.get("LastName_1"), Some(&Value::from("Smith")));
}

#[test]
fn every_dialect_pages_a_sorted_select() {
    let sort = [predicate::asc("LastName").unwrap()];
    for kind in ALL {
        let generator = SqlGenerator::new(kind.dialect());
        let stmt = generator
            .select_paged(Person::metadata(), None, &sort, 2, 10)
            .unwrap();
        let referenced = stmt.referenced_parameters(kind.dialect().parameter_prefix());
        assert!(!referenced.is_empty(), "{kind}: {}", stmt.sql);
        for name in referenced {
            assert!(stmt.parameters.contains(name), "{kind}: {name} unbound");
        }
    }
}

#[test]
fn paging_without_sort_is_rejected() {
    let generator = SqlGenerator::new(DialectKind::Sqlite.dialect());
    assert!(matches!(
        generator.select_paged(Person::metadata(), None, &[], 0, 10),
        Err(QuarryError::Validation(_))
    ));
}

#[test]
fn composite_key_predicate_compiles_in_key_order() {
    let generator = SqlGenerator::new(DialectKind::MySql.dialect());
    let key = predicate::key_predicate(
        Multikey::metadata(),
        &[Value::BigInt(Some(1)), Value::from("a")],
    )
    .unwrap();
    let stmt = generator.delete(Multikey::metadata(), Some(&key)).unwrap();
    assert_eq!(
        stmt.sql,
        "DELETE FROM `Multikey` WHERE (`Multikey`.`Key1` = @Key1_0 AND `Multikey`.`Key2` = @Key2_1)"
    );
}

#[test]
fn positional_rewrite_for_numbered_drivers() {
    let generator = SqlGenerator::new(DialectKind::Postgres.dialect());
    let filter = predicate::or(vec![
        predicate::field("FirstName", Operator::Eq, "a").unwrap(),
        predicate::field("LastName", Operator::Eq, "b").unwrap(),
    ]);
    let stmt = generator.count(Person::metadata(), Some(&filter)).unwrap();
    let (sql, values) = stmt.to_positional('@', PlaceholderStyle::Numbered).unwrap();
    assert_eq!(
        sql,
        "SELECT COUNT(*) AS \"Total\" FROM \"Person\" \
         WHERE (\"Person\".\"FirstName\" = $1 OR \"Person\".\"LastName\" = $2)"
    );
    assert_eq!(values, vec![Value::from("a"), Value::from("b")]);
}
