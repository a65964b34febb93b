//! Purpose: Walk a schema and write its DDL and data as a dump directory.
//! Exports: `ExportSession`, `ExportReport`.
//! Role: Export-side orchestration over the encoder, LOB store, and database seam.
//! Invariants: The file-index prefix is session-scoped and strictly increasing.
//! Invariants: Object- and row-scoped failures are logged and skipped; only
//! connection loss aborts the walk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::encode::encode_row;
use crate::core::error::{Error, ErrorKind};
use crate::core::lob::LobStore;
use crate::core::text::TextEncoding;
use crate::db::{Database, ObjectKind};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExportReport {
    pub tables: u64,
    pub rows: u64,
    pub rows_skipped: u64,
    pub objects: u64,
    pub objects_skipped: u64,
}

/// One export pass over a schema, writing into one dump directory.
pub struct ExportSession<'a, D: Database + ?Sized> {
    db: &'a mut D,
    dir: PathBuf,
    schema: String,
    encoding: TextEncoding,
    file_index: u64,
}

impl<'a, D: Database + ?Sized> ExportSession<'a, D> {
    pub fn new(db: &'a mut D, dir: impl Into<PathBuf>, schema: &str, encoding: TextEncoding) -> Self {
        Self {
            db,
            dir: dir.into(),
            schema: schema.to_string(),
            encoding,
            file_index: 0,
        }
    }

    /// Export every table (DDL + data), then sequences, triggers, and
    /// functions, in deterministic filesystem order.
    pub fn export_schema(&mut self) -> Result<ExportReport, Error> {
        let mut report = ExportReport::default();

        let tables = self.db.object_names(ObjectKind::Table, &self.schema)?;
        for table in tables {
            match self.export_table(&table, &mut report) {
                Ok(()) => report.tables += 1,
                Err(err) => {
                    contain(err, &format!("table {table}"))?;
                    report.objects_skipped += 1;
                }
            }
        }

        self.export_objects(ObjectKind::Sequence, "_SEQ_DDL.sql", &mut report)?;
        self.export_objects(ObjectKind::Trigger, "_TRG_DDL.sql", &mut report)?;
        self.export_objects(ObjectKind::Function, "_FUNC_DDL.sql", &mut report)?;

        Ok(report)
    }

    /// Export one table: a `<idx>_<TABLE>_DDL.sql` file and a
    /// `<idx>_<TABLE>_inserts.sql` file with one dump statement per row.
    pub fn export_table(&mut self, table: &str, report: &mut ExportReport) -> Result<(), Error> {
        info!(table, "exporting table");
        if let Some(ddl) = self
            .db
            .object_ddl(ObjectKind::Table, table, &self.schema)?
        {
            let path = self.indexed_path(&format!("{table}_DDL.sql"));
            self.write_text(&path, &ddl)?;
        }
        self.export_table_data(table, report)
    }

    /// Statements stream to the inserts file one row at a time, so rows
    /// already encoded survive a failure partway through a large table.
    fn export_table_data(&mut self, table: &str, report: &mut ExportReport) -> Result<(), Error> {
        let path = self.indexed_path(&format!("{table}_inserts.sql"));
        let qualified = format!("{}.{}", self.schema, table);
        let encoding = self.encoding;
        let lobs = LobStore::new(&self.dir, encoding);

        let mut file = fs::File::create(&path)
            .map_err(|err| Error::new(ErrorKind::Io).with_path(&path).with_source(err))?;
        let mut ordinal = 0u64;
        let mut rows = self.db.query(&format!("SELECT * FROM {qualified}"))?;
        let columns = rows.columns().to_vec();
        while let Some(row) = rows.next_row()? {
            ordinal += 1;
            match encode_row(&qualified, table, &columns, &row, ordinal, &lobs)
                .and_then(|statement| encoding.encode(&statement))
            {
                Ok(bytes) => {
                    file.write_all(&bytes).map_err(|err| {
                        Error::new(ErrorKind::Io).with_path(&path).with_source(err)
                    })?;
                    report.rows += 1;
                }
                Err(err) => {
                    contain(err, &format!("row {ordinal} of {qualified}"))?;
                    report.rows_skipped += 1;
                }
            }
        }
        Ok(())
    }

    fn export_objects(
        &mut self,
        kind: ObjectKind,
        suffix: &str,
        report: &mut ExportReport,
    ) -> Result<(), Error> {
        info!(kind = kind.as_str(), "exporting objects");
        let names = self.db.object_names(kind, &self.schema)?;
        for name in names {
            match self.export_object(kind, &name, suffix) {
                Ok(true) => report.objects += 1,
                Ok(false) => {}
                Err(err) => {
                    contain(err, &format!("{} {name}", kind.as_str()))?;
                    report.objects_skipped += 1;
                }
            }
        }
        Ok(())
    }

    fn export_object(&mut self, kind: ObjectKind, name: &str, suffix: &str) -> Result<bool, Error> {
        let Some(ddl) = self.db.object_ddl(kind, name, &self.schema)? else {
            return Ok(false);
        };
        let path = self.indexed_path(&format!("{name}{suffix}"));
        self.write_text(&path, &ddl)?;
        Ok(true)
    }

    /// Next `%07d_`-prefixed path, keeping files ordered across object kinds.
    fn indexed_path(&mut self, name: &str) -> PathBuf {
        let prefix = format!("{:07}_", self.file_index);
        self.file_index += 1;
        self.dir.join(format!("{prefix}{name}"))
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<(), Error> {
        let bytes = self.encoding.encode(text)?;
        fs::write(path, bytes)
            .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))
    }
}

/// Per-object and per-row containment: connection loss is fatal, everything
/// else is logged and skipped.
fn contain(err: Error, unit: &str) -> Result<(), Error> {
    if err.kind() == ErrorKind::Connection {
        return Err(err);
    }
    warn!(%err, unit, "skipping failed export unit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::contain;
    use crate::core::error::{Error, ErrorKind};

    #[test]
    fn containment_lets_connection_loss_escalate() {
        assert!(contain(Error::new(ErrorKind::Io), "table T").is_ok());
        assert!(contain(Error::new(ErrorKind::Corrupt), "row 3").is_ok());
        assert!(contain(Error::new(ErrorKind::Connection), "table T").is_err());
    }
}
