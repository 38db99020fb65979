//! Message decoding: flat header block + body split into a [`Record`].
//!
//! Only RFC 5322 framing is handled: header fields up to the first blank line (with folded
//! continuation lines), then the body verbatim. MIME structure and transfer encodings are left alone.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Record;
use crate::engine::dates::normalize_date;

/// Turns a file into a [`Record`]. Implementations must not keep the file open after returning.
pub trait MessageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Record, DecodeError>;
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: empty message", .0.display())]
    Empty(PathBuf),

    #[error("{}: malformed header line {line}", .path.display())]
    MalformedHeader { path: PathBuf, line: usize },

    #[error("{}: missing {name} header", .path.display())]
    MissingHeader { path: PathBuf, name: &'static str },
}

impl DecodeError {
    /// The file this error occurred at.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Empty(path)
            | Self::MalformedHeader { path, .. }
            | Self::MissingHeader { path, .. } => path,
        }
    }
}

/// Header names read into a record.
pub struct HeaderNames;

impl HeaderNames {
    pub const MESSAGE_ID: &'static str = "Message-ID";
    pub const DATE: &'static str = "Date";
    pub const FROM: &'static str = "From";
    pub const TO: &'static str = "To";
    pub const SUBJECT: &'static str = "Subject";
}

/// Default decoder: reads the whole file, splits headers from body, normalizes `Date`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderBodyDecoder;

impl MessageDecoder for HeaderBodyDecoder {
    fn decode(&self, path: &Path) -> Result<Record, DecodeError> {
        let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode_bytes(path, &bytes)
    }
}

impl HeaderBodyDecoder {
    /// Decode an in-memory message. `path` is only used for error reporting.
    pub fn decode_bytes(&self, path: &Path, bytes: &[u8]) -> Result<Record, DecodeError> {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return Err(DecodeError::Empty(path.to_path_buf()));
        }
        let (headers, body) =
            split_message(&text).map_err(|line| DecodeError::MalformedHeader {
                path: path.to_path_buf(),
                line,
            })?;

        let date = header_value(&headers, HeaderNames::DATE)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DecodeError::MissingHeader {
                path: path.to_path_buf(),
                name: HeaderNames::DATE,
            })?;

        let field = |name: &str| header_value(&headers, name).unwrap_or_default().to_string();
        Ok(Record {
            message_id: header_value(&headers, HeaderNames::MESSAGE_ID)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            date: normalize_date(date),
            from: field(HeaderNames::FROM),
            to: field(HeaderNames::TO),
            subject: field(HeaderNames::SUBJECT),
            body: body.to_string(),
        })
    }
}

/// Header fields in file order.
pub type Headers = Vec<(String, String)>;

/// First value for `name`, matched case-insensitively.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Split `text` into header fields and body. On a malformed header returns its 1-based line number.
///
/// A file that ends inside the header block has an empty body.
pub fn split_message(text: &str) -> Result<(Headers, &str), usize> {
    let mut headers: Headers = Vec::new();
    let mut offset = 0_usize;
    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches(['\n', '\r']);
        offset += raw.len();
        if line.is_empty() {
            return Ok((headers, &text[offset..]));
        }
        if line.starts_with([' ', '\t']) {
            match headers.last_mut() {
                Some((_, value)) => {
                    let cont = line.trim();
                    if !cont.is_empty() {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(cont);
                    }
                }
                None => return Err(line_no),
            }
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) if is_field_name(name) => {
                headers.push((name.to_string(), value.trim().to_string()));
            }
            _ => return Err(line_no),
        }
    }
    Ok((headers, ""))
}

/// RFC 5322 field name: one or more printable ASCII characters, no colon, no whitespace.
fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':')
}
