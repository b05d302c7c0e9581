//! Redaction policy and detection thresholds sent with a submission.
//!
//! The client does not interpret these values; they are passed through to
//! the service unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PII categories and redaction methods
// ---------------------------------------------------------------------------

/// PII categories the service knows how to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiType {
    Person,
    Phone,
    Email,
    Aadhaar,
    Pan,
    Ifsc,
    AccountNo,
    Face,
    Signature,
    Stamp,
    Date,
    Org,
}

impl PiiType {
    /// Every category, in the order the service documents them.
    pub const ALL: [PiiType; 12] = [
        Self::Person,
        Self::Phone,
        Self::Email,
        Self::Aadhaar,
        Self::Pan,
        Self::Ifsc,
        Self::AccountNo,
        Self::Face,
        Self::Signature,
        Self::Stamp,
        Self::Date,
        Self::Org,
    ];

    /// Wire tag, e.g. `"ACCOUNT_NO"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Phone => "PHONE",
            Self::Email => "EMAIL",
            Self::Aadhaar => "AADHAAR",
            Self::Pan => "PAN",
            Self::Ifsc => "IFSC",
            Self::AccountNo => "ACCOUNT_NO",
            Self::Face => "FACE",
            Self::Signature => "SIGNATURE",
            Self::Stamp => "STAMP",
            Self::Date => "DATE",
            Self::Org => "ORG",
        }
    }

    /// Method the service applies when no policy overrides it.
    pub fn default_method(self) -> RedactionMethod {
        match self {
            Self::Phone => RedactionMethod::Replace,
            Self::Face | Self::Signature => RedactionMethod::Blur,
            _ => RedactionMethod::Mask,
        }
    }
}

impl std::fmt::Display for PiiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transformation applied to a detected region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMethod {
    /// Cover with an opaque box.
    #[default]
    Mask,
    Blur,
    /// Replace with placeholder text.
    Replace,
    Remove,
}

impl RedactionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Blur => "blur",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

impl std::fmt::Display for RedactionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Mapping from PII category to redaction method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedactionPolicy(BTreeMap<PiiType, RedactionMethod>);

impl RedactionPolicy {
    /// Method configured for `pii_type`, falling back to its default.
    pub fn method_for(&self, pii_type: PiiType) -> RedactionMethod {
        self.0
            .get(&pii_type)
            .copied()
            .unwrap_or_else(|| pii_type.default_method())
    }

    pub fn set(&mut self, pii_type: PiiType, method: RedactionMethod) {
        self.0.insert(pii_type, method);
    }

    pub fn iter(&self) -> impl Iterator<Item = (PiiType, RedactionMethod)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self(
            PiiType::ALL
                .iter()
                .map(|t| (*t, t.default_method()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Numeric detection thresholds. No cross-field validation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub ocr_confidence: f64,
    /// Minimum confidence for text PII (named-entity) detections.
    pub ner_confidence: f64,
    pub face_threshold: f64,
    pub signature_threshold: f64,
    /// Extra pixels added around every redacted region.
    pub padding_px: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ocr_confidence: 0.5,
            ner_confidence: 0.6,
            face_threshold: 0.5,
            signature_threshold: 0.35,
            padding_px: 4,
        }
    }
}

/// Policy plus thresholds, the full set of user-tunable settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactionSettings {
    #[serde(default)]
    pub policies: RedactionPolicy,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl RedactionSettings {
    /// Restore the service defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
