//! Model types used by the HTTP subsystem itself.

use crate::errors::*;
use crate::serde::*;
use derive_setters::*;
use crate::model::types::MessageId;
use reqwest::multipart::Part;
use std::borrow::Cow;

/// The decoded body of an API response.
///
/// Discord normally answers with JSON, but intermediate proxies can answer with plain
/// text, so both are preserved.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseValue {
    /// A JSON response body.
    Json(JsonValue),
    /// A non-JSON response body.
    Text(String),
}
impl ResponseValue {
    /// Deserializes the response into the given type.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ResponseValue::Json(value) =>
                serde_json::from_value(value).bad_response("Could not parse API response."),
            ResponseValue::Text(_) =>
                Err(Error::new(ErrorKind::DiscordBadResponse("API response was not JSON."))),
        }
    }

    /// Returns the response as raw JSON, if it was JSON.
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ResponseValue::Json(value) => Some(value),
            ResponseValue::Text(_) => None,
        }
    }

    /// Parses the Discord error envelope out of the response, if one is present.
    pub(crate) fn discord_error(&self) -> DiscordError {
        match self.as_json() {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_default(),
            None => DiscordError::default(),
        }
    }
}

/// A file to be uploaded as part of an API call.
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// The name the file is uploaded under.
    pub filename: String,
    /// The mime type of the file. Guessed from the file name if not set.
    pub mime_type: Option<String>,
    /// The contents of the file.
    pub data: Cow<'static, [u8]>,
}
impl UploadFile {
    /// Creates a new file from its name and contents.
    pub fn new(filename: impl Into<String>, data: impl Into<Cow<'static, [u8]>>) -> UploadFile {
        UploadFile {
            filename: filename.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    /// Sets the mime type of the file.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> UploadFile {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Converts the file into a multipart form part.
    ///
    /// A new part is created for every attempt of a request, so retries always upload
    /// the file from the start.
    pub(crate) fn to_part(&self) -> Result<Part> {
        let mime_type = match &self.mime_type {
            Some(mime) => mime.clone(),
            None => mime_guess::from_path(&self.filename).first_or_octet_stream().to_string(),
        };
        Part::bytes(self.data.clone())
            .file_name(self.filename.clone())
            .mime_str(&mime_type)
            .invalid_input("File has an invalid mime type.")
    }
}

/// Optional parameters for the `Create Message` endpoint.
#[derive(Serialize, Default, Clone, Debug, Setters)]
#[setters(strip_option, generate_private = "false")]
#[non_exhaustive]
pub struct CreateMessageParams {
    /// The text content of the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[setters(into)]
    pub content: Option<String>,
    /// A nonce used to identify the message later.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[setters(into)]
    pub nonce: Option<String>,
    /// Whether the message should be read by text-to-speech.
    #[serde(skip_serializing_if = "utils::if_false")]
    #[setters(bool)]
    pub tts: bool,
}
impl CreateMessageParams {
    /// Creates parameters for a plain text message.
    pub fn text(content: impl Into<String>) -> CreateMessageParams {
        CreateMessageParams::default().content(content)
    }
}

/// Optional parameters for the `Edit Message` endpoint.
#[derive(Serialize, Default, Clone, Debug, Setters)]
#[setters(strip_option, generate_private = "false")]
#[non_exhaustive]
pub struct EditMessageParams {
    /// The new text content of the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[setters(into)]
    pub content: Option<String>,
}

/// Optional parameters for the `Get Channel Messages` endpoint.
#[derive(Serialize, Default, Clone, Debug, Setters)]
#[setters(strip_option, generate_private = "false")]
#[non_exhaustive]
pub struct GetChannelMessagesParams {
    /// Only retrieve messages sent around this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub around: Option<MessageId>,
    /// Only retrieve messages sent before this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<MessageId>,
    /// Only retrieve messages sent after this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<MessageId>,
    /// The maximum number of messages to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
