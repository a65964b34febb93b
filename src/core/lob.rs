//! Purpose: Externalized LOB files: deterministic naming plus Base64 read/write.
//! Exports: `LobRef`, `LobStore`, `LOB_FILE_SUFFIX`.
//! Role: The only durable representation of a LOB's content; pure I/O, no SQL knowledge.
//! Invariants: File names are bit-exact `<KIND>_<TABLE>_<COLUMN>_<seq %05d>.base64`.
//! Invariants: Sequence numbers are 1-based row ordinals scoped per (table, column).

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::core::error::{Error, ErrorKind};
use crate::core::text::TextEncoding;
use crate::core::value::LobKind;

pub const LOB_FILE_SUFFIX: &str = ".base64";

/// Composite key identifying one externalized LOB file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LobRef {
    pub kind: LobKind,
    pub table: String,
    pub column: String,
    pub sequence: u64,
}

impl LobRef {
    pub fn new(kind: LobKind, table: &str, column: &str, sequence: u64) -> Self {
        Self {
            kind,
            table: table.to_string(),
            column: column.to_string(),
            sequence,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{:05}{LOB_FILE_SUFFIX}",
            self.kind, self.table, self.column, self.sequence
        )
    }

    /// Recognize `<KIND>_<TABLE>_<COLUMN>_<5 digits>.base64`.
    ///
    /// Table and column may themselves contain underscores; the split is
    /// non-greedy on the table side, matching the historical dump format.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(LOB_FILE_SUFFIX)?;
        let (kind_text, rest) = stem.split_once('_')?;
        let kind = LobKind::parse(kind_text)?;
        let (middle, seq_text) = rest.rsplit_once('_')?;
        if seq_text.len() != 5 || !seq_text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (table, column) = middle.split_once('_')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        let sequence = seq_text.parse().ok()?;
        Some(Self {
            kind,
            table: table.to_string(),
            column: column.to_string(),
            sequence,
        })
    }
}

/// Reads and writes Base64-encoded LOB files under one dump directory.
pub struct LobStore {
    dir: PathBuf,
    encoding: TextEncoding,
}

impl LobStore {
    pub fn new(dir: impl Into<PathBuf>, encoding: TextEncoding) -> Self {
        Self {
            dir: dir.into(),
            encoding,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn write_blob(
        &self,
        table: &str,
        column: &str,
        sequence: u64,
        bytes: &[u8],
    ) -> Result<String, Error> {
        self.write(LobRef::new(LobKind::Blob, table, column, sequence), bytes)
    }

    pub fn write_clob(
        &self,
        table: &str,
        column: &str,
        sequence: u64,
        text: &str,
    ) -> Result<String, Error> {
        let bytes = self.encoding.encode(text)?;
        self.write(LobRef::new(LobKind::Clob, table, column, sequence), &bytes)
    }

    fn write(&self, lob_ref: LobRef, bytes: &[u8]) -> Result<String, Error> {
        let file_name = lob_ref.file_name();
        let path = self.dir.join(&file_name);
        let body = STANDARD.encode(bytes);
        fs::write(&path, body)
            .map_err(|err| Error::new(ErrorKind::Io).with_path(&path).with_source(err))?;
        Ok(file_name)
    }

    /// Read one LOB file back to raw bytes. An absent file is reported as
    /// `NotFound` with the expected path, so callers can skip just that row.
    pub fn read(&self, file_name: &str) -> Result<Vec<u8>, Error> {
        let path = self.dir.join(file_name);
        let body = fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("missing LOB file {file_name}"))
                    .with_path(&path)
                    .with_source(err)
            } else {
                Error::new(ErrorKind::Io).with_path(&path).with_source(err)
            }
        })?;
        // Some tools wrap Base64 bodies; strip all whitespace before decoding.
        let compact: String = body.split_whitespace().collect();
        STANDARD.decode(compact.as_bytes()).map_err(|err| {
            Error::new(ErrorKind::Corrupt)
                .with_message("LOB file is not valid Base64")
                .with_path(&path)
                .with_source(err)
        })
    }

    /// Read a CLOB file back to text using the configured encoding.
    pub fn read_clob(&self, file_name: &str) -> Result<String, Error> {
        let bytes = self.read(file_name)?;
        self.encoding.decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{LobRef, LobStore};
    use crate::core::error::ErrorKind;
    use crate::core::text::TextEncoding;
    use crate::core::value::LobKind;

    #[test]
    fn file_names_are_zero_padded_and_scoped() {
        let lob_ref = LobRef::new(LobKind::Blob, "T", "DATA", 1);
        assert_eq!(lob_ref.file_name(), "BLOB_T_DATA_00001.base64");
        let lob_ref = LobRef::new(LobKind::Clob, "DOCS", "BODY", 123);
        assert_eq!(lob_ref.file_name(), "CLOB_DOCS_BODY_00123.base64");
    }

    #[test]
    fn parse_round_trips_file_names() {
        let original = LobRef::new(LobKind::Clob, "DOCS", "BODY_TEXT", 7);
        let parsed = LobRef::parse(&original.file_name()).expect("parse");
        assert_eq!(parsed.kind, LobKind::Clob);
        assert_eq!(parsed.sequence, 7);
        assert_eq!(parsed.file_name(), original.file_name());
    }

    #[test]
    fn parse_rejects_malformed_names() {
        assert!(LobRef::parse("BLOB_T_DATA_00001.txt").is_none());
        assert!(LobRef::parse("NCLOB_T_DATA_00001.base64").is_none());
        assert!(LobRef::parse("BLOB_T_DATA_001.base64").is_none());
        assert!(LobRef::parse("BLOB_TDATA_00001.base64").is_none());
        assert!(LobRef::parse("BLOB_T_DATA_0000x.base64").is_none());
    }

    #[test]
    fn blob_write_read_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LobStore::new(dir.path(), TextEncoding::Utf8);
        let bytes = vec![0u8, 1, 2, 254, 255];
        let name = store.write_blob("T", "DATA", 1, &bytes).expect("write");
        assert_eq!(name, "BLOB_T_DATA_00001.base64");
        assert_eq!(store.read(&name).expect("read"), bytes);
    }

    #[test]
    fn clob_uses_configured_encoding() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LobStore::new(dir.path(), TextEncoding::Latin1);
        let name = store.write_clob("T", "NOTA", 2, "a\u{f1}o").expect("write");
        let raw = store.read(&name).expect("read");
        assert_eq!(raw, vec![b'a', 0xF1, b'o']);
        assert_eq!(store.read_clob(&name).expect("decode"), "a\u{f1}o");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LobStore::new(dir.path(), TextEncoding::Utf8);
        let err = store.read("BLOB_T_DATA_00009.base64").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("BLOB_T_DATA_00009.base64"));
    }

    #[test]
    fn garbage_body_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("BLOB_T_DATA_00001.base64"), "@@not-base64@@")
            .expect("write");
        let store = LobStore::new(dir.path(), TextEncoding::Utf8);
        let err = store.read("BLOB_T_DATA_00001.base64").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }
}
