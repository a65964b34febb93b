//! Purpose: Port through which every session talks to a live database.
//! Exports: `Database`, `RowSource`, `ObjectKind`.
//! Role: Boundary trait; the crate never opens connections itself.
//! Invariants: Rows arrive in cursor order, one at a time.
//! Invariants: `object_ddl` returns None for objects without exportable DDL.

use crate::core::error::Error;
use crate::core::value::{ColumnValue, Row};

/// Schema object categories the export walk enumerates, named as
/// DBMS_METADATA expects them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObjectKind {
    Table,
    Sequence,
    Trigger,
    Function,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Sequence => "SEQUENCE",
            Self::Trigger => "TRIGGER",
            Self::Function => "FUNCTION",
        }
    }
}

/// A forward-only cursor over one query's results.
pub trait RowSource {
    /// Column names in select order; stable for the cursor's lifetime.
    fn columns(&self) -> &[String];

    /// Next row, or None at end of cursor.
    fn next_row(&mut self) -> Result<Option<Row>, Error>;
}

/// An open database handle. How it was obtained (driver, credentials,
/// pooling) is the caller's concern.
pub trait Database {
    /// Execute one statement without binds (DDL, script lines).
    fn execute(&mut self, sql: &str) -> Result<(), Error>;

    fn commit(&mut self) -> Result<(), Error>;

    /// Run a query and stream its rows.
    fn query(&mut self, sql: &str) -> Result<Box<dyn RowSource + '_>, Error>;

    /// Execute a parameterized insert, binding `values` positionally to the
    /// `?` placeholders. Null binds SQL NULL; Blob/Clob bind as binary and
    /// character streams respectively.
    fn insert(&mut self, sql: &str, values: &[ColumnValue]) -> Result<(), Error>;

    /// Names of all objects of `kind` owned by `schema`.
    fn object_names(&mut self, kind: ObjectKind, schema: &str) -> Result<Vec<String>, Error>;

    /// DDL for one object, as returned by the server's metadata call.
    fn object_ddl(
        &mut self,
        kind: ObjectKind,
        name: &str,
        schema: &str,
    ) -> Result<Option<String>, Error>;
}
