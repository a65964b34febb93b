//! Purpose: `oradump` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs offline commands, emits JSON on stdout.
//! Invariants: Commands never open database connections; export/import/run
//! against a live database are library APIs behind `oradump::db::Database`.
//! Invariants: Errors are emitted on stderr with hints; exit codes come from
//! `core::error::to_exit_code`.
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::aot::Shell;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use oradump::core::error::{Error, ErrorKind, to_exit_code};
use oradump::core::lob::LobRef;
use oradump::core::script::{LineKind, classify_line};
use oradump::core::text::TextEncoding;
use oradump::dump::{DumpStatus, check_dump};

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let cli = Cli::parse();
    let encoding = match &cli.encoding {
        Some(name) => TextEncoding::parse(name)?,
        None => TextEncoding::Utf8,
    };

    match cli.command {
        Command::Check { dir } => {
            let report = check_dump(&dir, encoding)?;
            emit_json(&serde_json::to_value(&report).unwrap_or_default());
            if report.status == DumpStatus::Corrupt {
                return Ok(to_exit_code(ErrorKind::Corrupt));
            }
            Ok(0)
        }
        Command::Script { command } => match command {
            ScriptCommand::Classify { file } => {
                let bytes = fs::read(&file).map_err(|err| {
                    Error::new(ErrorKind::NotFound)
                        .with_message("script file is not readable")
                        .with_path(&file)
                        .with_source(err)
                })?;
                let text = encoding.decode(&bytes)?;
                let mut comments = 0u64;
                let mut statements = 0u64;
                let mut empty = 0u64;
                for line in text.lines() {
                    match classify_line(line).0 {
                        LineKind::Comment => comments += 1,
                        LineKind::Statement => statements += 1,
                        LineKind::Empty => empty += 1,
                    }
                }
                emit_json(&json!({
                    "file": file,
                    "comments": comments,
                    "statements": statements,
                    "empty": empty,
                }));
                Ok(0)
            }
        },
        Command::Lob { command } => match command {
            LobCommand::Decode { file, output } => {
                let (dir, name) = split_lob_path(&file)?;
                let store = oradump::core::lob::LobStore::new(dir, encoding);
                let bytes = store.read(&name)?;
                match output {
                    Some(path) => fs::write(&path, &bytes).map_err(|err| {
                        Error::new(ErrorKind::Io).with_path(&path).with_source(err)
                    })?,
                    None => io::stdout().write_all(&bytes).map_err(|err| {
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write decoded LOB")
                            .with_source(err)
                    })?,
                }
                Ok(0)
            }
        },
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "oradump", &mut io::stdout());
            Ok(0)
        }
    }
}

fn split_lob_path(file: &PathBuf) -> Result<(PathBuf, String), Error> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message("LOB path has no file name")
                .with_path(file)
        })?;
    if LobRef::parse(&name).is_none() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("`{name}` is not a LOB file name"))
            .with_hint("Expected <KIND>_<TABLE>_<COLUMN>_<00001>.base64."));
    }
    let dir = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, name))
}

fn emit_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("error: failed to serialize output: {err}"),
    }
}

fn emit_error(err: &Error) {
    eprintln!("error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "oradump",
    version,
    about = "Inspect and verify Oracle dump directories and SQL replay scripts",
    long_about = "Offline companion to the oradump library.\n\n\
Dump directories hold numbered DDL/insert files plus externalized LOBs\n\
(<KIND>_<TABLE>_<COLUMN>_<00001>.base64). Export, import, and script replay\n\
against a live database are library APIs; wire your driver through\n\
`oradump::db::Database`."
)]
struct Cli {
    /// Text encoding of dump and script files (UTF-8 or ISO-8859-1).
    #[arg(long, global = true)]
    encoding: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a dump directory: grammar, quote balance, LOB references.
    Check {
        /// Dump directory to verify.
        dir: PathBuf,
    },
    /// SQL replay script utilities.
    Script {
        #[command(subcommand)]
        command: ScriptCommand,
    },
    /// Externalized LOB file utilities.
    Lob {
        #[command(subcommand)]
        command: LobCommand,
    },
    /// Generate shell completions.
    Completion {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ScriptCommand {
    /// Classify each line as comment, statement, or empty and report counts.
    Classify {
        /// Script file to classify.
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum LobCommand {
    /// Base64-decode one externalized LOB file.
    Decode {
        /// LOB file (its name must follow the dump naming scheme).
        file: PathBuf,
        /// Write raw bytes here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
