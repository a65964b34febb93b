// Dump-directory sessions: export, import, and offline checking.
mod check;
mod export;
mod import;

pub use check::{DumpIssue, DumpReport, DumpStatus, check_dump};
pub use export::{ExportReport, ExportSession};
pub use import::{ImportReport, ImportSession};
