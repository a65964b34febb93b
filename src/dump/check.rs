//! Purpose: Offline verification of a dump directory, no database needed.
//! Exports: `DumpReport`, `DumpStatus`, `DumpIssue`, `check_dump`.
//! Role: Shared contract for CLI diagnostics before an import is attempted.
//! Invariants: Checking never mutates the dump; issues carry file/line coordinates.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::decode::decode_values;
use crate::core::error::{Error, ErrorKind};
use crate::core::lob::LobStore;
use crate::core::text::TextEncoding;
use crate::core::tokenize::{parse_insert, split_values};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpStatus {
    Ok,
    Corrupt,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DumpIssue {
    pub code: String,
    pub file: String,
    pub line: Option<u64>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DumpReport {
    pub path: PathBuf,
    pub status: DumpStatus,
    pub files_checked: u64,
    pub statements: u64,
    pub lob_references: u64,
    pub issues: Vec<DumpIssue>,
}

impl DumpReport {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            status: DumpStatus::Ok,
            files_checked: 0,
            statements: 0,
            lob_references: 0,
            issues: Vec::new(),
        }
    }

    fn push_issue(&mut self, code: &str, file: &Path, line: Option<u64>, message: String) {
        self.status = DumpStatus::Corrupt;
        self.issues.push(DumpIssue {
            code: code.to_string(),
            file: file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string()),
            line,
            message,
        });
    }
}

/// Parse every dump statement in `dir`, verify quote balance and token
/// classification, and resolve every LOB reference down to a Base64 decode.
pub fn check_dump(dir: &Path, encoding: TextEncoding) -> Result<DumpReport, Error> {
    let mut report = DumpReport::new(dir.to_path_buf());
    let lobs = LobStore::new(dir, encoding);

    for path in insert_files(dir)? {
        report.files_checked += 1;
        let text = match fs::read(&path) {
            Ok(bytes) => match encoding.decode(&bytes) {
                Ok(text) => text,
                Err(err) => {
                    report.push_issue("encoding", &path, None, err.to_string());
                    continue;
                }
            },
            Err(err) => {
                report.push_issue("io", &path, None, err.to_string());
                continue;
            }
        };
        check_file(&text, &path, &lobs, &mut report);
    }

    Ok(report)
}

fn check_file(text: &str, path: &Path, lobs: &LobStore, report: &mut DumpReport) {
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index as u64 + 1;
        report.statements += 1;

        let parsed = match parse_insert(line) {
            Ok(parsed) => parsed,
            Err(err) => {
                report.push_issue("malformed", path, Some(line_no), err.to_string());
                continue;
            }
        };
        let tokens = match split_values(&parsed.values_text) {
            Ok(tokens) => tokens,
            Err(err) => {
                report.push_issue("unbalanced", path, Some(line_no), err.to_string());
                continue;
            }
        };
        report.lob_references += tokens
            .iter()
            .filter(|token| token.starts_with("'FILE:"))
            .count() as u64;
        if let Err(err) = decode_values(&tokens, lobs) {
            let code = match err.kind() {
                ErrorKind::NotFound => "missing-lob",
                _ => "bad-lob",
            };
            report.push_issue(code, path, Some(line_no), err.to_string());
        }
    }
}

fn insert_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Error::new(ErrorKind::NotFound)
            .with_message("dump directory is not readable")
            .with_path(dir)
            .with_source(err)
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|err| Error::new(ErrorKind::Io).with_path(dir).with_source(err))?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with("_inserts.sql"))
        {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::{DumpStatus, check_dump};
    use crate::core::text::TextEncoding;

    fn write(dir: &std::path::Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).expect("write");
    }

    #[test]
    fn clean_dump_reports_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "0000000_T_inserts.sql",
            "INSERT INTO S.T VALUES ('1', NULL, 'a,b');\n",
        );
        let report = check_dump(dir.path(), TextEncoding::Utf8).expect("check");
        assert_eq!(report.status, DumpStatus::Ok);
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.statements, 1);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn missing_lob_file_is_an_issue() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "0000000_T_inserts.sql",
            "INSERT INTO S.T VALUES ('FILE:BLOB_T_DATA_00001.base64');\n",
        );
        let report = check_dump(dir.path(), TextEncoding::Utf8).expect("check");
        assert_eq!(report.status, DumpStatus::Corrupt);
        assert_eq!(report.lob_references, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, "missing-lob");
        assert_eq!(report.issues[0].line, Some(1));
    }

    #[test]
    fn unbalanced_quotes_are_an_issue() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "0000000_T_inserts.sql",
            "INSERT INTO S.T VALUES ('broken);\n",
        );
        let report = check_dump(dir.path(), TextEncoding::Utf8).expect("check");
        assert_eq!(report.status, DumpStatus::Corrupt);
        assert_eq!(report.issues[0].code, "unbalanced");
    }

    #[test]
    fn non_insert_files_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "0000000_T_DDL.sql", "CREATE TABLE T (ID NUMBER);\n");
        let report = check_dump(dir.path(), TextEncoding::Utf8).expect("check");
        assert_eq!(report.files_checked, 0);
        assert_eq!(report.status, DumpStatus::Ok);
    }
}
