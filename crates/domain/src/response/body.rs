//! Response body normalization.
//!
//! A recorded body is read once, in full. Bodies declared as JSON are
//! re-indented with one tab per nesting level so that assertions and failure
//! dumps work on a stable, readable layout. Only insignificant whitespace
//! changes: strings and numbers are copied byte for byte.

use std::borrow::Cow;

use serde::de::IgnoredAny;

/// Content-Type marker that triggers JSON indentation.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The normalized body of a recorded response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseBody {
    bytes: Vec<u8>,
    indented: bool,
}

impl ResponseBody {
    /// Normalizes a raw payload according to its declared content type.
    ///
    /// A JSON payload that does not parse is kept verbatim.
    #[must_use]
    pub fn normalize(content_type: Option<&str>, raw: Vec<u8>) -> Self {
        if content_type.is_some_and(|ct| ct.contains(JSON_MEDIA_TYPE)) {
            if let Ok(bytes) = indent_json(&raw) {
                return Self {
                    bytes,
                    indented: true,
                };
            }
        }
        Self {
            bytes: raw,
            indented: false,
        }
    }

    /// Wraps raw bytes without any normalization.
    #[must_use]
    pub const fn raw(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            indented: false,
        }
    }

    /// The body of record.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Whether the body was re-indented as JSON.
    #[must_use]
    pub const fn is_indented(&self) -> bool {
        self.indented
    }

    /// Whether the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the body, read as text, contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }
}

fn indent_json(raw: &[u8]) -> serde_json::Result<Vec<u8>> {
    serde_json::from_slice::<IgnoredAny>(raw)?;

    let mut out = Vec::with_capacity(raw.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut bytes = raw.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if in_string {
            out.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'"' => {
                in_string = true;
                out.push(byte);
            }
            b'{' | b'[' => {
                out.push(byte);
                while bytes.next_if(|b| b.is_ascii_whitespace()).is_some() {}
                // Empty containers stay on one line.
                if let Some(close) = bytes.next_if(|b| matches!(*b, b'}' | b']')) {
                    out.push(close);
                } else {
                    depth += 1;
                    newline(&mut out, depth);
                }
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(byte);
            }
            b',' => {
                out.push(byte);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(byte),
        }
    }
    Ok(out)
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    out.extend(std::iter::repeat_n(b'\t', depth));
}
