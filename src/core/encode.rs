//! Purpose: Serialize one fetched row into a replayable dump statement.
//! Exports: `encode_row`, `escape_scalar`.
//! Role: Write side of the dump grammar; delegates LOB columns to the LOB store.
//! Invariants: Scalar quoting doubles every embedded `'`; NULL is emitted bare.
//! Invariants: LOB file sequence numbers are the row's 1-based export ordinal.

use crate::core::error::{Error, ErrorKind};
use crate::core::lob::LobStore;
use crate::core::value::{ColumnValue, Row};

/// Double embedded single quotes per SQL string-literal escaping.
pub fn escape_scalar(value: &str) -> String {
    value.replace('\'', "''")
}

/// Produce one `INSERT INTO <table> VALUES (...);` line for `row`.
///
/// `columns` supplies names for LOB file naming; `ordinal` is the 1-based
/// position of the row within this table's export pass. Errors (LOB store
/// I/O, a value with no matching column) fail the row.
pub fn encode_row(
    qualified_table: &str,
    table: &str,
    columns: &[String],
    row: &Row,
    ordinal: u64,
    lobs: &LobStore,
) -> Result<String, Error> {
    let mut statement = format!("INSERT INTO {qualified_table} VALUES (");
    for (index, value) in row.iter().enumerate() {
        if index > 0 {
            statement.push_str(", ");
        }
        match value {
            ColumnValue::Null => statement.push_str("NULL"),
            ColumnValue::Scalar(text) => {
                statement.push('\'');
                statement.push_str(&escape_scalar(text));
                statement.push('\'');
            }
            ColumnValue::Blob(bytes) => {
                let column = column_name(columns, index)?;
                let file_name = lobs.write_blob(table, column, ordinal, bytes)?;
                push_file_ref(&mut statement, &file_name);
            }
            ColumnValue::Clob(text) => {
                let column = column_name(columns, index)?;
                let file_name = lobs.write_clob(table, column, ordinal, text)?;
                push_file_ref(&mut statement, &file_name);
            }
        }
    }
    statement.push_str(");\n");
    Ok(statement)
}

// A cursor yielding more values than declared columns breaks the RowSource
// contract; report it instead of indexing out of bounds.
fn column_name(columns: &[String], index: usize) -> Result<&str, Error> {
    columns.get(index).map(String::as_str).ok_or_else(|| {
        Error::new(ErrorKind::Internal).with_message(format!(
            "row value {} has no matching column (declared: {})",
            index + 1,
            columns.len()
        ))
    })
}

fn push_file_ref(statement: &mut String, file_name: &str) {
    statement.push_str("'FILE:");
    statement.push_str(file_name);
    statement.push('\'');
}

#[cfg(test)]
mod tests {
    use super::{encode_row, escape_scalar};
    use crate::core::lob::LobStore;
    use crate::core::text::TextEncoding;
    use crate::core::value::ColumnValue;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn escaping_doubles_every_quote() {
        assert_eq!(escape_scalar("it's"), "it''s");
        assert_eq!(escape_scalar("''"), "''''");
        let input = "a'b'c'd";
        let escaped = escape_scalar(input);
        let quotes_in = input.matches('\'').count();
        let quotes_out = escaped.matches('\'').count();
        assert_eq!(quotes_out, 2 * quotes_in);
    }

    #[test]
    fn scalars_and_nulls_inline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lobs = LobStore::new(dir.path(), TextEncoding::Utf8);
        let row = vec![
            ColumnValue::Scalar("1".to_string()),
            ColumnValue::Null,
            ColumnValue::Scalar("o'brien".to_string()),
        ];
        let statement = encode_row(
            "HR.EMPLOYEES",
            "EMPLOYEES",
            &columns(&["ID", "MIDDLE", "NAME"]),
            &row,
            1,
            &lobs,
        )
        .expect("encode");
        assert_eq!(
            statement,
            "INSERT INTO HR.EMPLOYEES VALUES ('1', NULL, 'o''brien');\n"
        );
    }

    #[test]
    fn lob_columns_become_file_references() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lobs = LobStore::new(dir.path(), TextEncoding::Utf8);
        let row = vec![
            ColumnValue::Scalar("7".to_string()),
            ColumnValue::Blob(vec![1, 2, 3]),
            ColumnValue::Clob("body".to_string()),
        ];
        let statement = encode_row(
            "S.DOCS",
            "DOCS",
            &columns(&["ID", "DATA", "BODY"]),
            &row,
            4,
            &lobs,
        )
        .expect("encode");
        assert_eq!(
            statement,
            "INSERT INTO S.DOCS VALUES ('7', 'FILE:BLOB_DOCS_DATA_00004.base64', \
             'FILE:CLOB_DOCS_BODY_00004.base64');\n"
        );
        assert!(dir.path().join("BLOB_DOCS_DATA_00004.base64").exists());
        assert!(dir.path().join("CLOB_DOCS_BODY_00004.base64").exists());
    }

    #[test]
    fn lob_value_beyond_declared_columns_is_an_internal_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lobs = LobStore::new(dir.path(), TextEncoding::Utf8);
        let row = vec![
            ColumnValue::Scalar("1".to_string()),
            ColumnValue::Blob(vec![1]),
        ];
        let err = encode_row("S.T", "T", &columns(&["ID"]), &row, 1, &lobs).unwrap_err();
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Internal);
    }

    #[test]
    fn same_ordinal_may_repeat_across_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lobs = LobStore::new(dir.path(), TextEncoding::Utf8);
        let row = vec![
            ColumnValue::Blob(vec![9]),
            ColumnValue::Blob(vec![8]),
        ];
        let statement = encode_row("S.T", "T", &columns(&["A", "B"]), &row, 2, &lobs)
            .expect("encode");
        assert!(statement.contains("BLOB_T_A_00002.base64"));
        assert!(statement.contains("BLOB_T_B_00002.base64"));
    }
}
