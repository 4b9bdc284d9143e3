// src/models.rs
use serde::{Deserialize, Serialize};

/// The verdict returned to the client for one uploaded photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub is_safe: bool,
    pub explanation: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub kind: String,
}

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A base64 image ready to forward upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Accepts either bare base64 or a `data:<mime>;base64,<data>` URL.
    /// Returns `None` when there is nothing to send.
    pub fn parse(field: &str) -> Option<Self> {
        let field = field.trim();

        let (mime_type, data) = match field
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            Some((mime, data)) if !mime.is_empty() => (mime.to_string(), data.trim()),
            Some((_, data)) => (DEFAULT_IMAGE_MIME.to_string(), data.trim()),
            None => (DEFAULT_IMAGE_MIME.to_string(), field),
        };

        if data.is_empty() {
            return None;
        }

        Some(Self {
            mime_type,
            data: data.to_string(),
        })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
