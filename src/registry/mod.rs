//! Chunking profile registry.

use tracing::warn;

use crate::types::{ChunkingProfile, ProfileOverride, ProfileSelector};
use crate::DEFAULT_PROFILE;

/// Read-only table of named chunking profiles.
///
/// The registry is built once and then only read; share it by reference or
/// behind an `Arc`. Resolution never fails: anything it cannot honor falls
/// back to the `default` profile and is reported as a warning.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ChunkingProfile>,
    default_index: usize,
}

/// A profile picked for a run, plus any non-fatal warnings raised while
/// picking it.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub profile: ChunkingProfile,
    pub warnings: Vec<String>,
}

impl ProfileRegistry {
    /// Registry holding the five built-in profiles.
    pub fn builtin() -> Self {
        Self::with_profiles(ChunkingProfile::defaults())
    }

    /// Registry over a caller-supplied profile table.
    ///
    /// Later entries shadow earlier ones with the same name. The built-in
    /// `default` profile is added when the table does not define one.
    pub fn with_profiles(profiles: Vec<ChunkingProfile>) -> Self {
        let mut table: Vec<ChunkingProfile> = Vec::with_capacity(profiles.len() + 1);
        for profile in profiles {
            match table.iter_mut().find(|p| p.name == profile.name) {
                Some(existing) => *existing = profile,
                None => table.push(profile),
            }
        }

        let default_index = match table.iter().position(|p| p.name == DEFAULT_PROFILE) {
            Some(index) => index,
            None => {
                let builtin_default = ChunkingProfile::defaults()
                    .into_iter()
                    .find(|p| p.name == DEFAULT_PROFILE);
                if let Some(profile) = builtin_default {
                    table.insert(0, profile);
                }
                0
            }
        };

        Self {
            profiles: table,
            default_index,
        }
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Option<&ChunkingProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The fallback profile.
    pub fn default_profile(&self) -> &ChunkingProfile {
        &self.profiles[self.default_index]
    }

    /// All registered profiles, in registration order.
    pub fn list(&self) -> &[ChunkingProfile] {
        &self.profiles
    }

    /// Resolve a selector into a concrete profile.
    pub fn resolve(&self, selector: &ProfileSelector) -> ResolvedProfile {
        let mut warnings = Vec::new();
        let profile = match selector {
            ProfileSelector::Named(name) => self.lookup_or_default(name, &mut warnings).clone(),
            ProfileSelector::Custom(overrides) => self.apply_override(overrides, &mut warnings),
        };

        for warning in &warnings {
            warn!(profile = %profile.name, "{}", warning);
        }

        ResolvedProfile { profile, warnings }
    }

    fn lookup_or_default(&self, name: &str, warnings: &mut Vec<String>) -> &ChunkingProfile {
        match self.get(name) {
            Some(profile) => profile,
            None => {
                warnings.push(format!(
                    "unknown chunk profile '{}', falling back to '{}'",
                    name, DEFAULT_PROFILE
                ));
                self.default_profile()
            }
        }
    }

    fn apply_override(
        &self,
        overrides: &ProfileOverride,
        warnings: &mut Vec<String>,
    ) -> ChunkingProfile {
        let base = self.lookup_or_default(
            overrides.base.as_deref().unwrap_or(DEFAULT_PROFILE),
            warnings,
        );
        let custom = overrides.apply(base);

        match custom.validate() {
            Ok(()) => custom,
            Err(e) => {
                warnings.push(format!("{}; using '{}' instead", e, base.name));
                base.clone()
            }
        }
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
