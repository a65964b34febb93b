//! Purpose: Classify raw value tokens back into typed bind values.
//! Exports: `decode_token`, `decode_values`, `placeholders`.
//! Role: Read side of the round trip; inverse of the encoder's literal rules.
//! Invariants: Classification order is FILE reference, then NULL, then quoted scalar.
//! Invariants: A missing LOB backing file fails the row and names the expected file.

use crate::core::error::Error;
use crate::core::lob::{LobRef, LobStore};
use crate::core::value::{ColumnValue, LobKind, Row};

const FILE_PREFIX: &str = "'FILE:";

/// Decode one raw token into a bindable column value.
pub fn decode_token(token: &str, lobs: &LobStore) -> Result<ColumnValue, Error> {
    let token = token.trim();

    if let Some((file_name, lob_ref)) = file_reference(token) {
        return match lob_ref.kind {
            LobKind::Blob => Ok(ColumnValue::Blob(lobs.read(file_name)?)),
            LobKind::Clob => Ok(ColumnValue::Clob(lobs.read_clob(file_name)?)),
        };
    }

    if token.eq_ignore_ascii_case("NULL") {
        return Ok(ColumnValue::Null);
    }

    let text = if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        token[1..token.len() - 1].replace("''", "'")
    } else {
        // Tolerate bare literals the way the historical importer did.
        token.to_string()
    };
    Ok(ColumnValue::Scalar(text))
}

/// Decode every token of one statement's value list, in order.
pub fn decode_values(tokens: &[String], lobs: &LobStore) -> Result<Row, Error> {
    tokens
        .iter()
        .map(|token| decode_token(token, lobs))
        .collect()
}

/// Build the `?, ?, ...` placeholder list for a bound replay insert.
pub fn placeholders(count: usize) -> String {
    let mut out = String::new();
    for index in 0..count {
        if index > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}

fn file_reference(token: &str) -> Option<(&str, LobRef)> {
    let body = token.strip_prefix(FILE_PREFIX)?.strip_suffix('\'')?;
    LobRef::parse(body).map(|lob_ref| (body, lob_ref))
}
