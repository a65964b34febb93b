// In-memory Database double: records statements, serves canned tables/DDL,
// and can be told to reject statements containing a marker substring.
use std::collections::BTreeMap;

use oradump::core::error::{Error, ErrorKind};
use oradump::core::value::Row;
use oradump::db::{Database, ObjectKind, RowSource};

#[derive(Clone, Debug, Default)]
pub struct StoredTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Default)]
pub struct MemoryDb {
    pub tables: BTreeMap<String, StoredTable>,
    pub objects: BTreeMap<&'static str, Vec<String>>,
    pub ddl: BTreeMap<(&'static str, String), String>,
    pub executed: Vec<String>,
    pub commits: u64,
    pub fail_marker: Option<String>,
    pub drop_cursor_after: Option<usize>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(
        mut self,
        qualified: &str,
        columns: &[&str],
        rows: Vec<Row>,
    ) -> Self {
        let table = qualified.rsplit('.').next().unwrap_or(qualified);
        self.objects
            .entry("TABLE")
            .or_default()
            .push(table.to_string());
        self.ddl.insert(
            ("TABLE", table.to_string()),
            format!("CREATE TABLE {qualified} (...)"),
        );
        self.tables.insert(
            qualified.to_string(),
            StoredTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Cursors report connection loss after yielding `rows` rows.
    pub fn dropping_cursor_after(mut self, rows: usize) -> Self {
        self.drop_cursor_after = Some(rows);
        self
    }

    fn reject_if_marked(&self, sql: &str) -> Result<(), Error> {
        if let Some(marker) = &self.fail_marker {
            if sql.contains(marker.as_str()) {
                return Err(Error::new(ErrorKind::Corrupt)
                    .with_message(format!("statement rejected: {sql}")));
            }
        }
        Ok(())
    }
}

struct MemoryRows {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
    yielded: usize,
    drop_after: Option<usize>,
}

impl RowSource for MemoryRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>, Error> {
        if self.drop_after.is_some_and(|limit| self.yielded >= limit) {
            return Err(Error::new(ErrorKind::Connection).with_message("connection lost"));
        }
        self.yielded += 1;
        Ok(self.rows.next())
    }
}

impl Database for MemoryDb {
    fn execute(&mut self, sql: &str) -> Result<(), Error> {
        self.reject_if_marked(sql)?;
        self.executed.push(sql.to_string());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        self.commits += 1;
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<Box<dyn RowSource + '_>, Error> {
        let qualified = sql
            .strip_prefix("SELECT * FROM ")
            .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("unexpected query"))?;
        let table = self.tables.get(qualified).ok_or_else(|| {
            Error::new(ErrorKind::NotFound).with_message(format!("no table {qualified}"))
        })?;
        Ok(Box::new(MemoryRows {
            columns: table.columns.clone(),
            rows: table.rows.clone().into_iter(),
            yielded: 0,
            drop_after: self.drop_cursor_after,
        }))
    }

    fn insert(&mut self, sql: &str, values: &[oradump::core::value::ColumnValue]) -> Result<(), Error> {
        self.reject_if_marked(sql)?;
        let qualified = sql
            .strip_prefix("INSERT INTO ")
            .and_then(|rest| rest.split(' ').next())
            .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("unexpected insert"))?;
        self.executed.push(sql.to_string());
        self.tables
            .entry(qualified.to_string())
            .or_default()
            .rows
            .push(values.to_vec());
        Ok(())
    }

    fn object_names(&mut self, kind: ObjectKind, _schema: &str) -> Result<Vec<String>, Error> {
        Ok(self.objects.get(kind.as_str()).cloned().unwrap_or_default())
    }

    fn object_ddl(
        &mut self,
        kind: ObjectKind,
        name: &str,
        _schema: &str,
    ) -> Result<Option<String>, Error> {
        Ok(self.ddl.get(&(kind.as_str(), name.to_string())).cloned())
    }
}
