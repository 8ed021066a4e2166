//! The keyinfo layout ffmpeg reads positionally:
//!
//! ```text
//! <url>\n
//! <key file path>\n
//! [<iv>\n]
//! ```

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::error::{IoOp, KeyInfoError, Line};

/// Write the two or three keyinfo lines, returning the exact byte count.
pub(crate) fn write_lines<W: Write + ?Sized>(
    w: &mut W,
    url: &[u8],
    key_file: &[u8],
    iv: Option<&[u8]>,
) -> Result<u64, KeyInfoError> {
    let mut written = 0u64;
    write_line(w, Line::Url, url, &mut written)?;
    write_line(w, Line::KeyFile, key_file, &mut written)?;
    if let Some(iv) = iv {
        write_line(w, Line::Iv, iv, &mut written)?;
    }
    Ok(written)
}

// Like `write_all`, but keeps count so a failure can report how much landed.
fn write_line<W: Write + ?Sized>(
    w: &mut W,
    line: Line,
    body: &[u8],
    written: &mut u64,
) -> Result<(), KeyInfoError> {
    for part in [body, b"\n".as_slice()] {
        let mut buf = part;
        while !buf.is_empty() {
            match w.write(buf) {
                Ok(0) => {
                    return Err(KeyInfoError::Write {
                        line,
                        written: *written,
                        source: io::ErrorKind::WriteZero.into(),
                    })
                }
                Ok(n) => {
                    *written += n as u64;
                    buf = &buf[n..];
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(KeyInfoError::Write {
                        line,
                        written: *written,
                        source,
                    })
                }
            }
        }
    }
    Ok(())
}

/// A keyinfo file read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfoFile {
    pub url: String,
    pub key_file: PathBuf,
    pub iv: Option<String>,
}

impl KeyInfoFile {
    /// Parse keyinfo text. Every line must end in a bare `\n` and there must be
    /// two or three of them.
    pub fn parse(text: &str) -> Result<Self, KeyInfoError> {
        let body = text.strip_suffix('\n').ok_or_else(|| format_err("missing final newline"))?;
        if body.contains('\r') {
            return Err(format_err("carriage return in keyinfo"));
        }

        let lines: Vec<&str> = body.split('\n').collect();
        let (url, key_file, iv) = match lines.as_slice() {
            [url, key_file] => (*url, *key_file, None),
            [url, key_file, iv] => (*url, *key_file, Some(*iv)),
            other => {
                return Err(format_err(format!(
                    "expected 2 or 3 lines, found {}",
                    other.len()
                )))
            }
        };

        if key_file.is_empty() {
            return Err(format_err("empty key file line"));
        }
        if iv.is_some_and(str::is_empty) {
            return Err(format_err("empty iv line"));
        }

        Ok(Self {
            url: url.to_string(),
            key_file: PathBuf::from(key_file),
            iv: iv.map(str::to_string),
        })
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, KeyInfoError> {
        let text = fs::read_to_string(path).map_err(KeyInfoError::io(IoOp::ReadKeyInfoFile))?;
        Self::parse(&text)
    }
}

fn format_err(reason: impl Into<String>) -> KeyInfoError {
    KeyInfoError::Format {
        reason: reason.into(),
    }
}
