use crate::dialect::{bind_window, limitable, statement_body, window_end, SqlDialect};
use crate::error::QuarryResult;
use crate::query::Parameters;

/// SQLite: `"` quoting, `LIMIT .. OFFSET ..` paging, `LAST_INSERT_ROWID()` identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identity_sql(&self, table: &str) -> QuarryResult<String> {
        self.get_table_name(None, table, None)?;
        Ok(format!(
            "SELECT LAST_INSERT_ROWID() AS {}",
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
        let limit = bind_window(self, parameters, "_page_limit", max_results)?;
        let offset = bind_window(self, parameters, "_page_offset", first_result)?;
        Ok(format!("{body} LIMIT {limit} OFFSET {offset}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::Value;

    #[test]
    fn test_identity_sql() {
        assert_eq!(
            SqliteDialect.identity_sql("foo").unwrap(),
            "SELECT LAST_INSERT_ROWID() AS \"Id\""
        );
    }

    #[test]
    fn test_set_sql() {
        let mut params = Parameters::new();
        let sql = SqliteDialect
            .set_sql("SELECT * FROM \"foo\" ORDER BY \"a\"", 7, 3, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"foo\" ORDER BY \"a\" LIMIT @_page_limit OFFSET @_page_offset"
        );
        assert_eq!(params.get("_page_offset"), Some(&Value::BigInt(Some(7))));
    }
}
