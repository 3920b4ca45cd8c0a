//! Outgoing form payloads and submission
//!
//! The session builds a [`FormPayload`] - an inspectable multipart model -
//! so the caller's pre-submit hook can examine the outgoing fields and
//! append its own before anything hits the wire. Conversion to the HTTP
//! client's multipart form happens only at submit time.

use crate::encoder::EncodedImage;
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// One field of an outgoing multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// Binary file field
    File {
        /// Field name
        name: String,
        /// Suggested filename
        filename: String,
        /// MIME type of the bytes
        mime: String,
        /// File contents
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// The field name
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } => name,
            FormPart::File { name, .. } => name,
        }
    }
}

/// An outgoing multipart form body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

impl FormPayload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Append a binary file field
    pub fn append_file(
        &mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.parts.push(FormPart::File {
            name: name.into(),
            filename: filename.into(),
            mime: mime.into(),
            bytes,
        });
    }

    /// Append an encoded image under a field name
    pub fn append_image(&mut self, name: impl Into<String>, image: EncodedImage) {
        self.append_file(name, image.filename, image.mime, image.bytes);
    }

    /// All fields in append order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Find a field by name
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name() == name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the payload has no fields
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Convert into the HTTP client's multipart form
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    filename,
                    mime,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(filename)
                        .mime_str(&mime)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// How the submission response body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnDataType {
    /// Raw response text
    #[default]
    Text,
    /// Parse the response as JSON
    Json,
}

/// Parsed submission response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Raw text body
    Text(String),
    /// Parsed JSON body
    Json(serde_json::Value),
}

impl ResponseBody {
    /// The response as a JSON value (text wrapped as a string)
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            ResponseBody::Text(s) => serde_json::Value::String(s.clone()),
            ResponseBody::Json(v) => v.clone(),
        }
    }
}

/// Submit a form payload as a multipart POST
///
/// Transport-level failures (connection errors, non-success status) come
/// back as [`CaptureError::Transport`].
pub async fn post_multipart(
    client: &reqwest::Client,
    url: &str,
    payload: FormPayload,
    return_type: ReturnDataType,
) -> Result<ResponseBody> {
    let url = Url::parse(url)?;
    debug!(%url, fields = payload.len(), "submitting multipart payload");

    let form = payload.into_multipart()?;
    let response = client.post(url).multipart(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CaptureError::transport(format!(
            "server responded with {}",
            status
        )));
    }

    match return_type {
        ReturnDataType::Text => Ok(ResponseBody::Text(response.text().await?)),
        ReturnDataType::Json => Ok(ResponseBody::Json(response.json().await?)),
    }
}

/// Alert-style user notification sink
///
/// Transport failures are surfaced to the user through this (and also
/// routed to the completion callback); embedders map it onto whatever
/// blocking notification their shell provides.
pub trait Notifier: Send + Sync {
    /// Show a blocking, fire-and-forget notification
    fn alert(&self, message: &str);
}

/// Default notifier: logs at warn level
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        warn!(message, "capture alert");
    }
}
