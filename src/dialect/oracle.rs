use crate::dialect::{
    bind_window, paged_projection, statement_body, window_end, SqlDialect, PAGED_ALIAS,
    ROW_NUMBER_COLUMN,
};
use crate::error::{QuarryError, QuarryResult};
use crate::query::Parameters;

/// Oracle: `"` quoting, `:name` parameters, no `AS` before table aliases and a
/// `ROWNUM` derived-table wrap for paging. Identities come from sequences, so there is
/// no identity statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn parameter_prefix(&self) -> char {
        ':'
    }

    fn table_alias_keyword(&self) -> &'static str {
        " "
    }

    fn identity_sql(&self, table: &str) -> QuarryResult<String> {
        Err(QuarryError::validation(format!(
            "Oracle does not support identity retrieval for '{table}'; use an assigned or guid key"
        )))
    }

    fn set_sql(
        &self,
        sql: &str,
        first_result: u64,
        max_results: u64,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        let body = statement_body(sql)?;
        let end = window_end(first_result, max_results)?;
        let start = bind_window(self, parameters, "_page_start", first_result + 1)?;
        let end = bind_window(self, parameters, "_page_end", end)?;
        let inner = self.quote_string("_ss");
        let row_number = self.quote_string(ROW_NUMBER_COLUMN);
        let paged = self.quote_string(PAGED_ALIAS);
        let ordinal = self.get_column_name(Some(&paged), &row_number, None)?;
        let columns = paged_projection(self, body);
        Ok(format!(
            "SELECT {columns} FROM (SELECT {inner}.*, ROWNUM {row_number} FROM ({body}) {inner} \
             WHERE ROWNUM <= {end}) {paged} WHERE {ordinal} >= {start}"
        ))
    }
}
