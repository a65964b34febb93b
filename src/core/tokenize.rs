//! Purpose: Lexical splitting of dump statements into raw value tokens.
//! Exports: `split_values`, `parse_insert`, `ParsedInsert`.
//! Role: The read side of the dump grammar; purely lexical, no token interpretation.
//! Invariants: A comma splits only outside quotes; tokens are trimmed.
//! Invariants: An odd quote count is an explicit Corrupt error, never a silent mis-split.

use crate::core::error::{Error, ErrorKind};

/// A dump statement with its target and raw value-list text separated out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedInsert {
    pub table: String,
    pub values_text: String,
}

/// Split the parenthesized value-list body of an INSERT into raw tokens.
///
/// Single-pass quote-toggle automaton: every `'` flips the in-quotes flag,
/// so a doubled `''` inside a literal flips it twice and stays inside. This
/// is exactly equivalent to the doubled-quote escaping rule of the grammar.
pub fn split_values(values: &str) -> Result<Vec<String>, Error> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in values.chars() {
        if ch == '\'' {
            in_quotes = !in_quotes;
        }
        if ch == ',' && !in_quotes {
            tokens.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }

    if in_quotes {
        return Err(Error::new(ErrorKind::Corrupt)
            .with_message("unbalanced quotes in value list")
            .with_hint("The dump line has an odd number of single quotes."));
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    Ok(tokens)
}

/// Extract the qualified table name and value-list text from one dump line.
pub fn parse_insert(line: &str) -> Result<ParsedInsert, Error> {
    let malformed = |message: &str| {
        Error::new(ErrorKind::Corrupt)
            .with_message(format!("malformed insert statement: {message}"))
    };

    let into_at = line.find("INTO ").ok_or_else(|| malformed("no INTO clause"))?;
    let values_at = line
        .find(" VALUES ")
        .ok_or_else(|| malformed("no VALUES clause"))?;
    let table_at = into_at + "INTO ".len();
    if values_at < table_at {
        return Err(malformed("VALUES precedes INTO"));
    }

    let table = line[table_at..values_at].trim().to_string();
    if table.is_empty() {
        return Err(malformed("empty table name"));
    }

    let after_values = line[values_at + " VALUES ".len()..].trim_start();
    let body = after_values
        .strip_prefix('(')
        .ok_or_else(|| malformed("no opening parenthesis"))?;
    let close_at = body
        .rfind(')')
        .ok_or_else(|| malformed("no closing parenthesis"))?;

    Ok(ParsedInsert {
        table,
        values_text: body[..close_at].trim().to_string(),
    })
}
