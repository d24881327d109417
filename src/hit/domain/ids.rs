//! Identifier newtypes for local records and marketplace references.

use super::HitDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a local HIT record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitId(Uuid);

impl HitId {
    /// Creates a new random HIT identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a HIT identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for HitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a stored answer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(Uuid);

impl AnswerId {
    /// Creates a new random answer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an answer identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AnswerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a completion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionResultId(Uuid);

impl CompletionResultId {
    /// Creates a new random result identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a result identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CompletionResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompletionResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn non_empty(value: String, kind: &'static str) -> Result<String, HitDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HitDomainError::EmptyIdentifier { kind });
    }
    Ok(trimmed.to_owned())
}

/// Marketplace identifier of a HIT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteHitId(String);

impl RemoteHitId {
    /// Creates a validated marketplace HIT identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "HIT").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteHitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marketplace identifier of a HIT type (shared by HITs with equal settings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitTypeId(String);

impl HitTypeId {
    /// Creates a validated HIT type identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "HIT type").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marketplace identifier of an assignment. Also the local identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteAssignmentId(String);

impl RemoteAssignmentId {
    /// Creates a validated assignment identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "assignment").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteAssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque marketplace worker identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    /// Creates a validated worker identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "worker").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the experiment battery a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatteryId(String);

impl BatteryId {
    /// Creates a validated battery identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "battery").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatteryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the experiment template a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a validated template identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyIdentifier`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, HitDomainError> {
        non_empty(value.into(), "template").map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
