//! HTTP request body builder.
//!
//! This module turns form fields, file attachments and serializable values into
//! request bodies with the matching `Content-Type`.

use std::io::{Cursor, Read};
use std::path::Path;

use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use wirecheck_application::RecorderError;

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// Failed to read an attachment's bytes.
    #[error("Failed to read file: {message}")]
    FileReadError {
        /// What went wrong, prefixed with the file name.
        message: String,
    },

    /// Invalid body configuration.
    #[error("Invalid body configuration: {message}")]
    InvalidConfig {
        /// What went wrong.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// What went wrong.
        message: String,
    },
}

impl From<BodyBuildError> for RecorderError {
    fn from(error: BodyBuildError) -> Self {
        match error {
            BodyBuildError::SerializationError { .. } => Self::Encoding(error.to_string()),
            BodyBuildError::FileReadError { .. } | BodyBuildError::InvalidConfig { .. } => {
                Self::Multipart(error.to_string())
            }
        }
    }
}

/// A named byte stream sent as one file part of a multipart body.
pub struct FileAttachment {
    file_name: String,
    reader: Box<dyn Read + Send>,
}

impl FileAttachment {
    /// Attach the bytes produced by `reader` under `file_name`.
    pub fn new(file_name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            reader: Box::new(reader),
        }
    }

    /// Attach in-memory bytes.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(file_name, Cursor::new(bytes.into()))
    }

    /// Attach a file from disk. The part's file name is the path's last component.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self::new(file_name, file))
    }

    /// The file name sent with the part.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn into_part(mut self) -> Result<Part, BodyBuildError> {
        let mut content = Vec::new();
        std::io::copy(&mut self.reader, &mut content).map_err(|e| {
            BodyBuildError::FileReadError {
                message: format!("{}: {e}", self.file_name),
            }
        })?;

        let mime_type = mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string();

        Part::bytes(content)
            .file_name(self.file_name)
            .mime_str(&mime_type)
            .map_err(|e| BodyBuildError::InvalidConfig {
                message: format!("Invalid MIME type: {e}"),
            })
    }
}

impl std::fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAttachment")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Result of building a body.
#[derive(Debug)]
pub enum BuiltBody {
    /// No body.
    None,
    /// Text/JSON body with content type.
    Text {
        /// Encoded body.
        content: String,
        /// Value for the `Content-Type` header.
        content_type: String,
    },
    /// Multipart form data.
    Multipart(Form),
}

impl BuiltBody {
    /// Attach the body and its content type to a request under construction.
    #[must_use]
    pub fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Text {
                content,
                content_type,
            } => builder.header(CONTENT_TYPE, content_type).body(content),
            Self::Multipart(form) => builder.multipart(form),
        }
    }
}

/// Build an `application/x-www-form-urlencoded` body.
///
/// `fields` is anything `serde_urlencoded` accepts: a map, or a slice of pairs.
///
/// # Errors
///
/// Returns [`BodyBuildError::SerializationError`] when the fields are not a flat
/// sequence of key/value pairs.
pub fn build_form_body<T: Serialize + ?Sized>(fields: &T) -> Result<BuiltBody, BodyBuildError> {
    let content =
        serde_urlencoded::to_string(fields).map_err(|e| BodyBuildError::SerializationError {
            message: e.to_string(),
        })?;
    Ok(BuiltBody::Text {
        content,
        content_type: mime::APPLICATION_WWW_FORM_URLENCODED.to_string(),
    })
}

/// Build an `application/json` body.
///
/// # Errors
///
/// Returns [`BodyBuildError::SerializationError`] when `data` fails to serialize,
/// e.g. a map with non-string keys.
pub fn build_json_body<T: Serialize + ?Sized>(data: &T) -> Result<BuiltBody, BodyBuildError> {
    let content = serde_json::to_string(data).map_err(|e| BodyBuildError::SerializationError {
        message: e.to_string(),
    })?;
    Ok(BuiltBody::Text {
        content,
        content_type: mime::APPLICATION_JSON.to_string(),
    })
}

/// Build a `multipart/form-data` body from text fields and file attachments.
///
/// Each attachment's stream is read to the end before the form is returned.
///
/// # Errors
///
/// Returns [`BodyBuildError::FileReadError`] if a stream fails while copying.
pub fn build_multipart_body<I, K, V, J, N>(fields: I, files: J) -> Result<BuiltBody, BodyBuildError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
    J: IntoIterator<Item = (N, FileAttachment)>,
    N: Into<String>,
{
    let mut form = Form::new();

    for (name, value) in fields {
        form = form.text(name.into(), value.into());
    }

    for (name, attachment) in files {
        form = form.part(name.into(), attachment.into_part()?);
    }

    Ok(BuiltBody::Multipart(form))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::io::Write;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_build_form_urlencoded() {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), "john".to_string());
        fields.insert("password".to_string(), "s3cret&more".to_string());

        let result = build_form_body(&fields).unwrap();
        match result {
            BuiltBody::Text {
                content,
                content_type,
            } => {
                assert_eq!(content_type, "application/x-www-form-urlencoded");
                assert_eq!(content, "password=s3cret%26more&username=john");
            }
            _ => panic!("Expected Text body"),
        }
    }

    #[test]
    fn test_build_form_from_pairs() {
        let result = build_form_body(&[("email", "foo@example.com")]).unwrap();
        assert!(matches!(
            result,
            BuiltBody::Text { ref content, .. } if content == "email=foo%40example.com"
        ));
    }

    #[test]
    fn test_build_form_rejects_nested_values() {
        let nested = serde_json::json!({"outer": {"inner": 1}});
        let err = build_form_body(&nested).unwrap_err();
        assert!(matches!(err, BodyBuildError::SerializationError { .. }));
        assert!(matches!(RecorderError::from(err), RecorderError::Encoding(_)));
    }

    #[test]
    fn test_build_json_body() {
        let result = build_json_body(&serde_json::json!({"key": "value"})).unwrap();
        match result {
            BuiltBody::Text {
                content,
                content_type,
            } => {
                assert_eq!(content_type, "application/json");
                assert_eq!(content, r#"{"key":"value"}"#);
            }
            _ => panic!("Expected Text body"),
        }
    }

    #[test]
    fn test_build_json_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");
        let err = build_json_body(&map).unwrap_err();
        assert!(matches!(err, BodyBuildError::SerializationError { .. }));
    }

    #[test]
    fn test_build_multipart_body() {
        let result = build_multipart_body(
            [("title", "report")],
            [("upload", FileAttachment::from_bytes("notes.txt", "hello"))],
        )
        .unwrap();
        assert!(matches!(result, BuiltBody::Multipart(_)));
    }

    #[test]
    fn test_multipart_stream_failure() {
        let err = build_multipart_body(
            Vec::<(String, String)>::new(),
            [("upload", FileAttachment::new("broken.bin", BrokenReader))],
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken.bin: disk on fire"));
        assert!(matches!(
            RecorderError::from(err),
            RecorderError::Multipart(_)
        ));
    }

    #[test]
    fn test_open_uses_last_path_component() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG")
            .unwrap();

        let attachment = FileAttachment::open(&path).unwrap();
        assert_eq!(attachment.file_name(), "avatar.png");
    }

    #[test]
    fn test_open_missing_file() {
        assert!(FileAttachment::open("/definitely/not/here.txt").is_err());
    }

    #[test]
    fn test_none_body_leaves_request_untouched() {
        let client = reqwest::Client::new();
        let request = BuiltBody::None
            .apply(client.get("http://localhost/"))
            .build()
            .unwrap();
        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
    }
}
