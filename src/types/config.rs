//! Configuration types for chunking.

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;
use crate::{
    DEFAULT_MAX_CONCURRENT_DOCUMENTS, DEFAULT_MAX_CONTENT_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_PORT,
    DEFAULT_PROFILE,
};

/// Global chunking service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Profile used when a request does not name one
    pub active_profile: String,

    /// Maximum documents chunked concurrently
    pub max_concurrent_documents: usize,

    /// Maximum content size of a single document (bytes)
    pub max_content_size: usize,

    /// Directory that chunk jobs write their output under
    pub output_dir: String,

    /// HTTP port
    pub port: u16,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            active_profile: DEFAULT_PROFILE.to_string(),
            max_concurrent_documents: DEFAULT_MAX_CONCURRENT_DOCUMENTS,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ChunkingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            active_profile: std::env::var("CHUNK_PROFILE")
                .unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
            max_concurrent_documents: std::env::var("MAX_CONCURRENT_DOCUMENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_DOCUMENTS),
            max_content_size: std::env::var("MAX_CONTENT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONTENT_SIZE),
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

/// A named chunking profile: token thresholds plus structural flags.
///
/// Profiles are immutable once built. The built-in set lives in
/// [`crate::registry::ProfileRegistry`]; callers can derive new ones through
/// [`ProfileOverride`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingProfile {
    /// Profile name
    pub name: String,

    /// Profile description
    #[serde(default)]
    pub description: String,

    /// Size at which an accumulating chunk is emitted
    pub target_tokens: usize,

    /// Smallest size a non-final chunk should have
    pub min_tokens: usize,

    /// Largest size a chunk may have, barring oversized atomic paragraphs
    pub max_tokens: usize,

    /// Whether headings start new sections
    pub split_on_headings: bool,

    /// Whether fenced code blocks are atomic
    pub preserve_code_blocks: bool,

    /// Whether loose lists are kept together as one atomic paragraph
    pub preserve_lists: bool,

    /// Multiplier applied to the token estimate of fenced code blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_block_weight: Option<f64>,

    /// Cut oversized atomic paragraphs at line boundaries instead of
    /// emitting them as a single oversized chunk
    #[serde(default)]
    pub split_oversized: bool,
}

impl ChunkingProfile {
    fn builtin(
        name: &str,
        description: &str,
        target_tokens: usize,
        min_tokens: usize,
        max_tokens: usize,
        code_block_weight: Option<f64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target_tokens,
            min_tokens,
            max_tokens,
            split_on_headings: true,
            preserve_code_blocks: true,
            preserve_lists: true,
            code_block_weight,
            split_oversized: false,
        }
    }

    /// Create the built-in profiles.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::builtin(
                "default",
                "Balanced profile for general documentation",
                1000,
                200,
                1500,
                None,
            ),
            Self::builtin(
                "code-heavy",
                "Larger chunks with code blocks counted at half weight",
                1200,
                300,
                2000,
                Some(0.5),
            ),
            Self::builtin(
                "faq",
                "Small chunks for question/answer content",
                500,
                50,
                800,
                None,
            ),
            Self::builtin(
                "large-context",
                "Large chunks for long-context models",
                3000,
                500,
                5000,
                None,
            ),
            Self::builtin(
                "granular",
                "Small chunks for fine-grained retrieval",
                400,
                100,
                600,
                None,
            ),
        ]
    }

    /// Check the threshold ordering and the code weight.
    pub fn validate(&self) -> Result<(), ChunkError> {
        let invalid = |reason: String| ChunkError::InvalidProfile {
            name: self.name.clone(),
            reason,
        };

        if self.min_tokens == 0 {
            return Err(invalid("min_tokens must be positive".to_string()));
        }
        if self.min_tokens > self.target_tokens || self.target_tokens > self.max_tokens {
            return Err(invalid(format!(
                "expected min <= target <= max, got {}/{}/{}",
                self.min_tokens, self.target_tokens, self.max_tokens
            )));
        }
        if let Some(weight) = self.code_block_weight {
            if !weight.is_finite() || weight <= 0.0 || weight > 1.0 {
                return Err(invalid(format!(
                    "code_block_weight must be in (0, 1], got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Partial profile that overrides fields of a base profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverride {
    /// Name of the profile to start from (`default` when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tokens: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tokens: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_on_headings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_code_blocks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_lists: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_block_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_oversized: Option<bool>,
}

impl ProfileOverride {
    /// Apply the overrides on top of `base`.
    ///
    /// An override without a name is called `custom`.
    pub fn apply(&self, base: &ChunkingProfile) -> ChunkingProfile {
        ChunkingProfile {
            name: self.name.clone().unwrap_or_else(|| "custom".to_string()),
            description: format!("Custom profile derived from '{}'", base.name),
            target_tokens: self.target_tokens.unwrap_or(base.target_tokens),
            min_tokens: self.min_tokens.unwrap_or(base.min_tokens),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            split_on_headings: self.split_on_headings.unwrap_or(base.split_on_headings),
            preserve_code_blocks: self
                .preserve_code_blocks
                .unwrap_or(base.preserve_code_blocks),
            preserve_lists: self.preserve_lists.unwrap_or(base.preserve_lists),
            code_block_weight: self.code_block_weight.or(base.code_block_weight),
            split_oversized: self.split_oversized.unwrap_or(base.split_oversized),
        }
    }
}

/// How a caller picks the profile for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSelector {
    /// One of the registered profiles, by name
    Named(String),
    /// A base profile with overridden fields
    Custom(ProfileOverride),
}

impl ProfileSelector {
    /// Select a registered profile by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl Default for ProfileSelector {
    fn default() -> Self {
        Self::Named(DEFAULT_PROFILE.to_string())
    }
}

impl From<&str> for ProfileSelector {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}
