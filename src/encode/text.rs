use std::borrow::Cow;
use std::io::{self, Write};

use clap::ValueEnum;

use crate::error::RowDocError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Byte encoding used for text JSON output.
///
/// No byte-order mark is written; one is tolerated when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum TextEncoding {
    /// UTF-8, the platform default
    #[default]
    Utf8,
    /// UTF-16, little endian
    Utf16Le,
    /// UTF-16, big endian
    Utf16Be,
    /// ISO-8859-1; characters above U+00FF are rejected
    Latin1,
}

impl TextEncoding {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Latin1 => "iso-8859-1",
        }
    }

    /// Append the encoded form of `text` to `out`.
    ///
    /// `encoding_rs` only decodes UTF-16, so the UTF-16 output is written here.
    ///
    /// # Errors
    /// Returns `RowDocError::EncodingError` when a character has no representation.
    pub fn encode_into(self, text: &str, out: &mut Vec<u8>) -> Result<(), RowDocError> {
        match self {
            TextEncoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            TextEncoding::Utf16Le => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            TextEncoding::Utf16Be => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            TextEncoding::Latin1 => {
                out.reserve(text.len());
                for ch in text.chars() {
                    let byte = u8::try_from(u32::from(ch)).map_err(|_| {
                        RowDocError::EncodingError(format!(
                            "character {ch:?} (U+{:04X}) is not representable in {}",
                            u32::from(ch),
                            self.name()
                        ))
                    })?;
                    out.push(byte);
                }
            }
        }
        Ok(())
    }

    /// Decode bytes written in this encoding.
    ///
    /// # Errors
    /// Returns `RowDocError::DecodeError` on malformed input.
    pub fn decode(self, bytes: &[u8]) -> Result<String, RowDocError> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(body.to_vec())
                    .map_err(|e| RowDocError::DecodeError(format!("invalid utf-8: {e}")))
            }
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                let (bom, charset) = if self == TextEncoding::Utf16Le {
                    (UTF16LE_BOM, encoding_rs::UTF_16LE)
                } else {
                    (UTF16BE_BOM, encoding_rs::UTF_16BE)
                };
                let body = bytes.strip_prefix(bom).unwrap_or(bytes);
                if body.len() % 2 != 0 {
                    return Err(RowDocError::DecodeError(format!(
                        "{} input has an odd byte count ({})",
                        self.name(),
                        body.len()
                    )));
                }
                charset
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(Cow::into_owned)
                    .ok_or_else(|| {
                        RowDocError::DecodeError(format!("invalid {} input", self.name()))
                    })
            }
            // ISO-8859-1 bytes are the first 256 code points
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Writer adapter that accepts UTF-8 and forwards it to `inner` in the target encoding.
///
/// A multi-byte sequence split across `write` calls is held back until it completes.
pub(crate) struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: TextEncoding,
    pending: Vec<u8>,
    scratch: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    pub(crate) fn new(inner: W, encoding: TextEncoding) -> Self {
        Self {
            inner,
            encoding,
            pending: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Flush and surface any incomplete trailing sequence as an error.
    pub(crate) fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "utf-8 input ended inside a multi-byte sequence",
            ));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.encoding == TextEncoding::Utf8 && self.pending.is_empty() {
            self.inner.write_all(buf)?;
            return Ok(buf.len());
        }

        self.pending.extend_from_slice(buf);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        if valid > 0 {
            let text = std::str::from_utf8(&self.pending[..valid])
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.scratch.clear();
            self.encoding
                .encode_into(text, &mut self.scratch)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
            self.inner.write_all(&self.scratch)?;
            self.pending.drain(..valid);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
