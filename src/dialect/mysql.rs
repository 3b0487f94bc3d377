use crate::dialect::{bind_window, limitable, statement_body, window_end, SqlDialect};
use crate::error::QuarryResult;
use crate::query::Parameters;

/// MySQL / MariaDB: backtick quoting, `LIMIT offset, count` paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    fn supports_multiple_statements(&self) -> bool {
        true
    }

    fn identity_sql(&self, table: &str) -> QuarryResult<String> {
        self.get_table_name(None, table, None)?;
        Ok(format!(
            "SELECT CONVERT(LAST_INSERT_ID(), SIGNED INTEGER) AS {}",
            self.quote_string("Id")
        ))
    }

    fn set_sql(
        &self,
        sql: &str,
        first_result: u64,
        max_results: u64,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        let body = limitable(self, statement_body(sql)?);
        window_end(first_result, max_results)?;
        let offset = bind_window(self, parameters, "_page_offset", first_result)?;
        let limit = bind_window(self, parameters, "_page_limit", max_results)?;
        Ok(format!("{body} LIMIT {offset}, {limit}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::Value;

    #[test]
    fn test_quoting() {
        let d = MySqlDialect;
        assert_eq!(d.quote_string("foo"), "`foo`");
        assert_eq!(d.quote_string("`foo"), "`foo`");
        assert!(d.is_quoted("`foo`"));
        assert!(!d.is_quoted("\"foo\""));
        assert_eq!(
            d.get_table_name(Some("bar"), "foo", Some("al")).unwrap(),
            "`bar`.`foo` AS `al`"
        );
    }

    #[test]
    fn test_identity_sql() {
        assert_eq!(
            MySqlDialect.identity_sql("foo").unwrap(),
            "SELECT CONVERT(LAST_INSERT_ID(), SIGNED INTEGER) AS `Id`"
        );
    }

    #[test]
    fn test_paging_sql() {
        let mut params = Parameters::new();
        let sql = MySqlDialect
            .paging_sql("SELECT * FROM `foo` ORDER BY `a`", 1, 25, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `foo` ORDER BY `a` LIMIT @_page_offset, @_page_limit"
        );
        assert_eq!(params.get("_page_offset"), Some(&Value::BigInt(Some(25))));
        assert_eq!(params.get("_page_limit"), Some(&Value::BigInt(Some(25))));
    }

    #[test]
    fn test_paging_wraps_existing_limit() {
        let mut params = Parameters::new();
        let sql = MySqlDialect
            .paging_sql("SELECT `a` FROM `t` ORDER BY `a` LIMIT 3 /* top three */", 0, 2, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT `a` FROM `t` ORDER BY `a` LIMIT 3) AS `_paged` LIMIT @_page_offset, @_page_limit"
        );
    }
}
