//! Minimal lexical scan of SQL text.
//!
//! Only bare words at parenthesis depth zero are reported. String literals, quoted
//! identifiers (`"..."`, `` `...` ``, `[...]`) and comments are skipped, so keywords
//! inside subqueries, window clauses or literals are never matched.

/// Bare words at nesting depth zero, with their byte offsets.
pub(crate) fn top_level_words(sql: &str) -> Vec<(usize, &str)> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_delimited(bytes, i, bytes[i]),
            b'[' => i = skip_delimited(bytes, i, b']'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                if depth == 0 {
                    words.push((start, &sql[start..i]));
                }
            }
            _ => i += 1,
        }
    }
    words
}

/// `sql` without trailing whitespace and comments.
pub(crate) fn strip_trailing_comments(sql: &str) -> &str {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut code_end = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_delimited(bytes, i, bytes[i]);
                code_end = i;
            }
            b'[' => {
                i = skip_delimited(bytes, i, b']');
                code_end = i;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                i += 1;
                code_end = i;
            }
        }
    }
    &sql[..code_end]
}

/// True when the statement already limits its rows at the top level
/// (`LIMIT`, `OFFSET` or `FETCH`).
pub(crate) fn has_row_limit(sql: &str) -> bool {
    top_level_words(sql).iter().any(|(_, word)| {
        ["LIMIT", "OFFSET", "FETCH"]
            .iter()
            .any(|keyword| word.eq_ignore_ascii_case(keyword))
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    /// Bare word or quoted identifier
    Name(&'a str),
    Dot,
    Other,
}

/// Output column names of a projection (the text after `SELECT`), as written.
///
/// Each item must be a possibly qualified column (`t.a` names `a`) or end in
/// `AS <name>`. Returns `None` for `*`, unaliased expressions and implicit aliases.
pub(crate) fn projection_names(projection: &str) -> Option<Vec<&str>> {
    let bytes = projection.as_bytes();
    let len = bytes.len();
    let mut items: Vec<Vec<Token<'_>>> = vec![Vec::new()];
    let mut depth = 0usize;
    let mut i = 0;

    while i < len {
        let token = match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b if b.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'"' | b'`' | b'[' => {
                let start = i;
                let close = if bytes[i] == b'[' { b']' } else { bytes[i] };
                i = skip_delimited(bytes, i, close);
                Token::Name(&projection[start..i])
            }
            b'\'' => {
                i = skip_delimited(bytes, i, b'\'');
                Token::Other
            }
            b'(' => {
                depth += 1;
                i += 1;
                Token::Other
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
                Token::Other
            }
            b'.' => {
                i += 1;
                Token::Dot
            }
            b',' if depth == 0 => {
                i += 1;
                items.push(Vec::new());
                continue;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let word = &projection[start..i];
                if depth == 0 && word.eq_ignore_ascii_case("FROM") {
                    break;
                }
                Token::Name(word)
            }
            _ => {
                i += 1;
                Token::Other
            }
        };
        if depth > 0 && token != Token::Other {
            continue;
        }
        if let Some(item) = items.last_mut() {
            item.push(token);
        }
    }

    items.iter().map(|item| item_name(item)).collect()
}

fn item_name<'a>(item: &[Token<'a>]) -> Option<&'a str> {
    match item {
        [.., Token::Name(keyword), Token::Name(alias)] if keyword.eq_ignore_ascii_case("AS") => {
            Some(*alias)
        }
        [Token::Name(first), rest @ ..] => {
            let mut name = *first;
            for pair in rest.chunks(2) {
                match pair {
                    [Token::Dot, Token::Name(part)] => name = *part,
                    _ => return None,
                }
            }
            Some(name)
        }
        _ => None,
    }
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
        i += 1;
    }
    (i + 2).min(bytes.len())
}

/// Index just past the closing delimiter of the token opened at `start`.
/// A doubled closing delimiter is an escape and does not end the token.
pub(crate) fn skip_delimited(bytes: &[u8], start: usize, close: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Split a statement at its last top-level `ORDER BY`.
///
/// Returns the statement without the clause and the order list, or `None` when the
/// statement has no top-level ORDER BY.
pub(crate) fn split_order_by(sql: &str) -> Option<(&str, &str)> {
    let words = top_level_words(sql);
    let position = words.windows(2).rposition(|pair| {
        pair[0].1.eq_ignore_ascii_case("ORDER") && pair[1].1.eq_ignore_ascii_case("BY")
    })?;
    let order_start = words[position].0;
    let list_start = words[position + 1].0 + "BY".len();
    let list = strip_trailing_comments(sql[list_start..].trim_start());
    if list.is_empty() {
        return None;
    }
    Some((strip_trailing_comments(&sql[..order_start]), list))
}

/// Projection and remainder of a statement that starts with `SELECT`.
pub(crate) fn strip_select(sql: &str) -> Option<&str> {
    let trimmed = sql.trim_start();
    let (offset, word) = *top_level_words(trimmed).first()?;
    if offset != 0 || !word.eq_ignore_ascii_case("SELECT") {
        return None;
    }
    Some(trimmed[word.len()..].trim_start())
}

/// First bare word of a fragment, if it starts with one.
pub(crate) fn leading_word(sql: &str) -> Option<&str> {
    let trimmed = sql.trim_start();
    top_level_words(trimmed)
        .first()
        .filter(|(offset, _)| *offset == 0)
        .map(|(_, word)| *word)
}
