//! Purpose: Replay a dump directory against a live database.
//! Exports: `ImportSession`, `ImportReport`.
//! Role: Import-side orchestration over the tokenizer, decoder, and database seam.
//! Invariants: Files replay in name order; the numeric prefix makes that the export order.
//! Invariants: Every insert line replays as one bound statement; a failed row
//! aborts that row only.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::decode::{decode_values, placeholders};
use crate::core::error::{Error, ErrorKind};
use crate::core::lob::LobStore;
use crate::core::text::TextEncoding;
use crate::core::tokenize::{parse_insert, split_values};
use crate::db::Database;

const TABLE_DDL_SUFFIX: &str = "_DDL.sql";
const SEQUENCE_DDL_SUFFIX: &str = "_SEQ_DDL.sql";
const TRIGGER_DDL_SUFFIX: &str = "_TRG_DDL.sql";
const FUNCTION_DDL_SUFFIX: &str = "_FUNC_DDL.sql";
const INSERTS_SUFFIX: &str = "_inserts.sql";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImportReport {
    pub scripts: u64,
    pub scripts_skipped: u64,
    pub rows: u64,
    pub rows_skipped: u64,
}

/// One import pass replaying a dump directory.
pub struct ImportSession<'a, D: Database + ?Sized> {
    db: &'a mut D,
    dir: PathBuf,
    encoding: TextEncoding,
}

impl<'a, D: Database + ?Sized> ImportSession<'a, D> {
    pub fn new(db: &'a mut D, dir: impl Into<PathBuf>, encoding: TextEncoding) -> Self {
        Self {
            db,
            dir: dir.into(),
            encoding,
        }
    }

    /// Replay the whole directory in dependency order: table DDL,
    /// sequences, data, functions, triggers.
    pub fn import_all(&mut self) -> Result<ImportReport, Error> {
        let mut report = ImportReport::default();
        self.import_scripts(TABLE_DDL_SUFFIX, &mut report)?;
        self.import_scripts(SEQUENCE_DDL_SUFFIX, &mut report)?;
        self.import_inserts(&mut report)?;
        self.import_scripts(FUNCTION_DDL_SUFFIX, &mut report)?;
        self.import_scripts(TRIGGER_DDL_SUFFIX, &mut report)?;
        Ok(report)
    }

    fn import_scripts(&mut self, suffix: &str, report: &mut ImportReport) -> Result<(), Error> {
        for path in self.files_with_suffix(suffix)? {
            info!(path = %path.display(), "importing script");
            match self.import_script(&path) {
                Ok(()) => report.scripts += 1,
                Err(err) => {
                    contain(err, &path)?;
                    report.scripts_skipped += 1;
                }
            }
        }
        Ok(())
    }

    fn import_script(&mut self, path: &Path) -> Result<(), Error> {
        let sql = self.read_text(path)?;
        self.db.execute(&sql)
    }

    fn import_inserts(&mut self, report: &mut ImportReport) -> Result<(), Error> {
        for path in self.files_with_suffix(INSERTS_SUFFIX)? {
            info!(path = %path.display(), "importing data");
            let text = match self.read_text(&path) {
                Ok(text) => text,
                Err(err) => {
                    contain(err, &path)?;
                    report.scripts_skipped += 1;
                    continue;
                }
            };
            self.replay_insert_lines(&text, &path, report)?;
            report.scripts += 1;
        }
        Ok(())
    }

    fn replay_insert_lines(
        &mut self,
        text: &str,
        path: &Path,
        report: &mut ImportReport,
    ) -> Result<(), Error> {
        let lobs = LobStore::new(&self.dir, self.encoding);
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index as u64 + 1;
            match self.replay_one(line, &lobs) {
                Ok(()) => report.rows += 1,
                Err(err) => {
                    contain(err.with_path(path).with_line(line_no), path)?;
                    report.rows_skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Tokenize one dump statement and replay it as a bound insert.
    fn replay_one(&mut self, line: &str, lobs: &LobStore) -> Result<(), Error> {
        let parsed = parse_insert(line)?;
        let tokens = split_values(&parsed.values_text)?;
        let values = decode_values(&tokens, lobs)?;
        let sql = format!(
            "INSERT INTO {} VALUES ({})",
            parsed.table,
            placeholders(values.len())
        );
        self.db.insert(&sql, &values)
    }

    /// Dump files carrying `suffix`, sorted by name. The table-DDL pass must
    /// not pick up the more specific sequence/trigger/function DDL files.
    fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>, Error> {
        let entries = fs::read_dir(&self.dir).map_err(|err| {
            Error::new(ErrorKind::NotFound)
                .with_message("dump directory is not readable")
                .with_path(&self.dir)
                .with_source(err)
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                Error::new(ErrorKind::Io).with_path(&self.dir).with_source(err)
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.ends_with(suffix) {
                continue;
            }
            if suffix == TABLE_DDL_SUFFIX && is_specialized_ddl(name) {
                continue;
            }
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }

    fn read_text(&self, path: &Path) -> Result<String, Error> {
        let bytes = fs::read(path)
            .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
        self.encoding.decode(&bytes)
    }
}

fn is_specialized_ddl(name: &str) -> bool {
    name.ends_with(SEQUENCE_DDL_SUFFIX)
        || name.ends_with(TRIGGER_DDL_SUFFIX)
        || name.ends_with(FUNCTION_DDL_SUFFIX)
}

/// Per-object and per-row containment, matching the export side.
fn contain(err: Error, path: &Path) -> Result<(), Error> {
    if err.kind() == ErrorKind::Connection {
        return Err(err);
    }
    warn!(%err, path = %path.display(), "skipping failed import unit");
    Ok(())
}
