//! Explicit settings for HIT synchronization.

use crate::hit::domain::{ExternalQuestion, HitId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_FRAME_HEIGHT: u32 = 900;
const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_frame_height() -> u32 {
    DEFAULT_FRAME_HEIGHT
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_response_groups() -> Vec<String> {
    vec!["Minimal".to_owned(), "HITDetail".to_owned()]
}

/// Errors returned while building a [`SyncConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The callback domain is empty after trimming.
    #[error("callback domain must not be empty")]
    EmptyDomain,

    /// The marketplace only loads question frames over HTTPS.
    #[error("callback domain '{0}' must start with 'https://'")]
    InsecureDomain(String),

    /// Assignment pages must hold at least one assignment.
    #[error("assignment page size must be positive")]
    InvalidPageSize,

    /// Question frames need a visible height.
    #[error("question frame height must be positive")]
    InvalidFrameHeight,
}

/// Serialized form of [`SyncConfig`], validated on conversion.
#[derive(Debug, Clone, Deserialize)]
struct RawSyncConfig {
    domain_name: String,
    #[serde(default = "default_frame_height")]
    frame_height: u32,
    #[serde(default = "default_page_size")]
    assignment_page_size: u32,
    #[serde(default = "default_response_groups")]
    response_groups: Vec<String>,
}

/// Settings passed to the sync service.
///
/// Holds the public HTTPS domain that serves question pages, the frame
/// height of the external question, the default assignment page size, and
/// the response groups requested when creating HITs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSyncConfig")]
pub struct SyncConfig {
    domain_name: String,
    frame_height: u32,
    assignment_page_size: u32,
    response_groups: Vec<String>,
}

impl SyncConfig {
    /// Creates a configuration with default frame height, page size, and
    /// response groups.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the domain is blank or not HTTPS.
    pub fn new(domain_name: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = domain_name.into();
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyDomain);
        }
        if !trimmed.starts_with("https://") {
            return Err(ConfigError::InsecureDomain(raw));
        }
        Ok(Self {
            domain_name: trimmed.to_owned(),
            frame_height: DEFAULT_FRAME_HEIGHT,
            assignment_page_size: DEFAULT_PAGE_SIZE,
            response_groups: default_response_groups(),
        })
    }

    /// Sets the question frame height.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFrameHeight`] for zero.
    pub fn with_frame_height(mut self, frame_height: u32) -> Result<Self, ConfigError> {
        if frame_height == 0 {
            return Err(ConfigError::InvalidFrameHeight);
        }
        self.frame_height = frame_height;
        Ok(self)
    }

    /// Sets the default assignment page size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageSize`] for zero.
    pub fn with_assignment_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        self.assignment_page_size = page_size;
        Ok(self)
    }

    /// Sets the response groups requested at HIT creation.
    #[must_use]
    pub fn with_response_groups(mut self, groups: impl IntoIterator<Item = String>) -> Self {
        self.response_groups = groups.into_iter().collect();
        self
    }

    /// Returns the callback domain without a trailing slash.
    #[must_use]
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Returns the question frame height.
    #[must_use]
    pub const fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// Returns the default assignment page size.
    #[must_use]
    pub const fn assignment_page_size(&self) -> u32 {
        self.assignment_page_size
    }

    /// Returns the response groups requested at HIT creation.
    #[must_use]
    pub fn response_groups(&self) -> &[String] {
        &self.response_groups
    }

    /// Returns the question URL for a local HIT: `<domain>/turk/<id>`.
    #[must_use]
    pub fn callback_url(&self, hit_id: HitId) -> String {
        format!("{}/turk/{hit_id}", self.domain_name)
    }

    /// Returns the external question for a local HIT.
    #[must_use]
    pub fn external_question(&self, hit_id: HitId) -> ExternalQuestion {
        ExternalQuestion {
            url: self.callback_url(hit_id),
            frame_height: self.frame_height,
        }
    }
}

impl TryFrom<RawSyncConfig> for SyncConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSyncConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.domain_name)?
            .with_frame_height(raw.frame_height)?
            .with_assignment_page_size(raw.assignment_page_size)?
            .with_response_groups(raw.response_groups))
    }
}
