use crate::dialect::{bind_window, limitable, statement_body, window_end, SqlDialect};
use crate::error::QuarryResult;
use crate::query::Parameters;

/// PostgreSQL: `"` quoting, `LIMIT .. OFFSET ..` paging, `LASTVAL()` identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identity_sql(&self, table: &str) -> QuarryResult<String> {
        self.get_table_name(None, table, None)?;
        Ok(format!("SELECT LASTVAL() AS {}", self.quote_string("Id")))
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
