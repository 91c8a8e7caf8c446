//! Types shared between the API client and its callers
//!
//! Wire names follow the service's JSON: camelCase fields and Mongo-style
//! `_id` identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account as the service returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Optional profile details nested under a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Access/refresh token pair minted by the service
///
/// The two tokens always travel together; the session layer installs and
/// clears them as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A stored transcription record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    #[serde(rename = "_id")]
    pub id: String,
    /// Name of the uploaded audio file
    pub original_name: String,
    /// Recognized text
    #[serde(rename = "transcription")]
    pub text: String,
    /// Recognizer confidence in `0..=1`, when the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Where an uploaded audio file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionSource {
    Recording,
    Upload,
}

impl TranscriptionSource {
    /// Classify a file by name: anything with "recording" in it counts as
    /// a microphone capture, the rest as uploads
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("recording") {
            Self::Recording
        } else {
            Self::Upload
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recording => "recording",
            Self::Upload => "upload",
        }
    }
}

impl std::fmt::Display for TranscriptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body for `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `PUT /auth/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Body for `PUT /auth/change-password`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Password-change form input; the confirmation never goes on the wire
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Body for `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body for `POST /auth/logout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// `data` payload of the register and login endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    pub user: User,
    pub tokens: TokenPair,
}

/// `data` payload of endpoints returning a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub user: User,
}

/// `data` payload of the refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub tokens: TokenPair,
}

/// `data` payload of the transcription list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionListData {
    #[serde(default)]
    pub transcriptions: Vec<Transcription>,
}

/// `data` payload of the transcription upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionData {
    pub transcription: Transcription,
}
