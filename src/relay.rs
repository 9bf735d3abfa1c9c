//! Request/response contract of the contact and review relays.
//!
//! The relays themselves (email delivery, bot notifications) live outside this
//! crate. These types describe what gets handed to them and what comes back,
//! and reject submissions the relays would refuse anyway.

use serde::{ Deserialize, Serialize };
use thiserror::Error;

/// Largest avatar the review relay accepts (2 MiB).
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

/// Image extensions the review relay accepts.
pub const AVATAR_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid file format, use jpg, png, gif or webp")]
    InvalidAvatarFormat,
    #[error("avatar is {size} bytes, the maximum is 2 MiB")]
    AvatarTooLarge {
        size: u64,
    },
}

impl SubmissionError {
    /// Translation key of the message shown next to the form.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "profile.requiredFields",
            Self::InvalidAvatarFormat | Self::AvatarTooLarge { .. } => "profile.avatarHelp",
        }
    }
}

/// Body sent to the email relay by the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl ContactSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        require("name", &self.name)?;
        require("message", &self.message)
    }
}

/// Uploaded avatar metadata; the bytes travel separately in the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub file_name: String,
    pub size: u64,
}

impl Avatar {
    /// Lower-cased text after the last `.`, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        match self.extension() {
            Some(ext) if AVATAR_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => return Err(SubmissionError::InvalidAvatarFormat),
        }
        if self.size > MAX_AVATAR_BYTES {
            return Err(SubmissionError::AvatarTooLarge { size: self.size });
        }
        Ok(())
    }
}

/// Multipart submission for the review relay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub name: String,
    pub review: String,
    pub job: Option<String>,
    pub url: Option<String>,
    pub avatar: Option<Avatar>,
}

impl ReviewSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        require("name", &self.name)?;
        require("review", &self.review)?;
        match &self.avatar {
            Some(avatar) => avatar.validate(),
            None => Ok(()),
        }
    }

    /// Text form fields in the order the relay reads them. Absent optional
    /// fields are sent as empty strings.
    pub fn form_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("review", self.review.as_str()),
            ("job", self.job.as_deref().unwrap_or_default()),
            ("url", self.url.as_deref().unwrap_or_default()),
        ]
    }
}

/// Reply of either relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
}

fn require(field: &'static str, value: &str) -> Result<(), SubmissionError> {
    if value.trim().is_empty() {
        return Err(SubmissionError::MissingField(field));
    }
    Ok(())
}
