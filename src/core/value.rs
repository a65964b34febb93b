//! Purpose: Typed row values shared by the encoder, decoder, and database seam.
//! Exports: `LobKind`, `ColumnValue`, `Row`.
//! Role: The tagged union that a dump statement serializes and a bound insert replays.
//! Invariants: Exactly one variant is populated per value; order within a `Row` is positional.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LobKind {
    Blob,
    Clob,
}

impl LobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "BLOB",
            Self::Clob => "CLOB",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "BLOB" => Some(Self::Blob),
            "CLOB" => Some(Self::Clob),
            _ => None,
        }
    }
}

impl fmt::Display for LobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of one fetched or replayed row.
///
/// `Scalar` carries the generic textual rendering of the source value
/// (numbers and dates included); large objects carry their full content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnValue {
    Null,
    Scalar(String),
    Blob(Vec<u8>),
    Clob(String),
}

impl ColumnValue {
    pub fn is_lob(&self) -> bool {
        matches!(self, Self::Blob(_) | Self::Clob(_))
    }
}

/// Ordered column values; length equals the table's column count at export time.
pub type Row = Vec<ColumnValue>;
