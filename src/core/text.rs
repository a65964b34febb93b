//! Purpose: Character encoding used for CLOB bodies and script files.
//! Exports: `TextEncoding`.
//! Role: Maps the `encoding`/`CODIFICACION` config surface onto byte codecs.
//! Invariants: UTF-8 is the default; Latin-1 covers legacy WE8ISO8859P1 dumps.

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            other => Err(Error::new(ErrorKind::Config)
                .with_message(format!("unsupported encoding `{other}`"))
                .with_hint("Supported encodings: UTF-8, ISO-8859-1.")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => {
                let mut bytes = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    let code = ch as u32;
                    if code > 0xFF {
                        return Err(Error::new(ErrorKind::Corrupt).with_message(format!(
                            "character U+{code:04X} is not representable in ISO-8859-1"
                        )));
                    }
                    bytes.push(code as u8);
                }
                Ok(bytes)
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|err| {
                Error::new(ErrorKind::Corrupt)
                    .with_message("invalid UTF-8 in character data")
                    .with_source(err)
            }),
            Self::Latin1 => Ok(bytes.iter().map(|b| char::from(*b)).collect()),
        }
    }
}
