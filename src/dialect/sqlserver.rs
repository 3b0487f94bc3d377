use crate::dialect::{
    bind_window, paged_projection, scan, statement_body, window_end, SqlDialect, PAGED_ALIAS,
    ROW_NUMBER_COLUMN,
};
use crate::error::{QuarryError, QuarryResult};
use crate::query::Parameters;

/// Microsoft SQL Server: `[...]` quoting, `SCOPE_IDENTITY()` identity.
///
/// Paging moves the statement's top-level `ORDER BY` into a `ROW_NUMBER()` column and
/// filters the resulting derived table on that ordinal:
///
/// ```text
/// SELECT [_paged].<column>, ... FROM (
///     SELECT ROW_NUMBER() OVER (ORDER BY <order>) AS [_row_number], <projection...>
/// ) AS [_paged]
/// WHERE [_paged].[_row_number] BETWEEN @_page_start AND @_page_end
/// ORDER BY [_paged].[_row_number]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    fn batch_separator(&self) -> &'static str {
        ";\nGO\n"
    }

    fn supports_multiple_statements(&self) -> bool {
        true
    }

    fn identity_sql(&self, table: &str) -> QuarryResult<String> {
        self.get_table_name(None, table, None)?;
        Ok(format!(
            "SELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS {}",
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
        let body = statement_body(sql)?;
        let end = window_end(first_result, max_results)?;

        let (unordered, order) = scan::split_order_by(body).ok_or_else(|| {
            QuarryError::validation("SQL Server paging requires an ORDER BY clause")
        })?;
        let projection = scan::strip_select(unordered).ok_or_else(|| {
            QuarryError::validation("SQL Server paging requires a SELECT statement")
        })?;
        if let Some(word) = scan::leading_word(projection) {
            if word.eq_ignore_ascii_case("DISTINCT") || word.eq_ignore_ascii_case("TOP") {
                return Err(QuarryError::validation(format!(
                    "SQL Server paging cannot rewrite a SELECT {} statement",
                    word.to_ascii_uppercase()
                )));
            }
        }

        let start = bind_window(self, parameters, "_page_start", first_result + 1)?;
        let end = bind_window(self, parameters, "_page_end", end)?;
        let row_number = self.quote_string(ROW_NUMBER_COLUMN);
        let paged = self.quote_string(PAGED_ALIAS);
        let ordinal = self.get_column_name(Some(&paged), &row_number, None)?;
        let columns = paged_projection(self, body);

        Ok(format!(
            "SELECT {columns} FROM (SELECT ROW_NUMBER() OVER (ORDER BY {order}) AS {row_number}, {projection}) AS {paged} \
             WHERE {ordinal} BETWEEN {start} AND {end} ORDER BY {ordinal}"
        ))
    }
}
