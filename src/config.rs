//! Purpose: Parse the properties-style configuration surfaces.
//! Exports: `parse_properties`, `ExportConfig`, `RunnerConfig`.
//! Role: Turns `key=value` text into typed settings; reading the file is the caller's job.
//! Invariants: Missing required keys are Config errors naming the key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::error::{Error, ErrorKind};
use crate::core::text::TextEncoding;

/// Parse `key=value` lines; blank lines and `#` comments are skipped.
/// Values may contain `=`; only the first one splits.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    entries
}

fn required(entries: &BTreeMap<String, String>, key: &str) -> Result<String, Error> {
    entries.get(key).cloned().ok_or_else(|| {
        Error::new(ErrorKind::Config)
            .with_message(format!("missing configuration key `{key}`"))
            .with_hint(format!("Add a `{key}=...` line to the configuration."))
    })
}

fn encoding_from(entries: &BTreeMap<String, String>, key: &str) -> Result<TextEncoding, Error> {
    match entries.get(key) {
        Some(name) => TextEncoding::parse(name),
        None => Ok(TextEncoding::Utf8),
    }
}

/// Settings for the export/import sessions (`jdbc.*` surface).
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub schema: String,
    pub encoding: TextEncoding,
}

impl ExportConfig {
    pub fn from_properties(text: &str) -> Result<Self, Error> {
        let entries = parse_properties(text);
        let user = required(&entries, "jdbc.user")?;
        let schema = entries
            .get("jdbc.schema")
            .cloned()
            .unwrap_or_else(|| user.clone());
        Ok(Self {
            url: required(&entries, "jdbc.url")?,
            password: required(&entries, "jdbc.password")?,
            encoding: encoding_from(&entries, "encoding")?,
            user,
            schema,
        })
    }
}

/// Settings for the script runner (`OracleScriptRunner.ini` surface).
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub ip: String,
    pub port: String,
    pub sid: String,
    pub user: String,
    pub password: String,
    pub script: PathBuf,
    pub encoding: TextEncoding,
    pub strip_semicolon: bool,
}

impl RunnerConfig {
    pub fn from_properties(text: &str) -> Result<Self, Error> {
        let entries = parse_properties(text);
        let strip_semicolon = match entries.get("ELIMINAR_PUNTO_Y_COMA") {
            None => true,
            Some(value) => match value.to_ascii_uppercase().as_str() {
                "SI" => true,
                "NO" => false,
                other => {
                    return Err(Error::new(ErrorKind::Config)
                        .with_message(format!("ELIMINAR_PUNTO_Y_COMA must be SI or NO, got `{other}`")));
                }
            },
        };
        Ok(Self {
            ip: required(&entries, "IP")?,
            port: required(&entries, "PUERTO")?,
            sid: required(&entries, "SID")?,
            user: required(&entries, "USUARIO")?,
            password: required(&entries, "CLAVE")?,
            script: PathBuf::from(required(&entries, "ARCHIVO_SQL")?),
            encoding: encoding_from(&entries, "CODIFICACION")?,
            strip_semicolon,
        })
    }

    /// EZConnect descriptor for whatever driver the caller wires in.
    pub fn connect_descriptor(&self) -> String {
        format!("{}:{}/{}", self.ip, self.port, self.sid)
    }
}
