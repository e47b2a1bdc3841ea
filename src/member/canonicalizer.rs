use serde::{Deserialize, Serialize};

use crate::settings::MemberSettings;

use super::text::{hiragana_to_katakana, katakana_to_hiragana, to_fullwidth_digits};
use super::PlayerRegistry;

/// Marker appended to names that are not in the registry when guest
/// substitution is off.
pub const UNREGISTERED_SUFFIX: &str = "(※)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOptions {
    pub apply_alias_replacement: bool,
    pub substitute_unregistered: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            apply_alias_replacement: true,
            substitute_unregistered: true,
        }
    }
}

/// Maps raw name tokens from chat onto registered player names.
#[derive(Debug, Clone, Copy)]
pub struct NameCanonicalizer<'a> {
    registry: &'a PlayerRegistry,
    guest_name: &'a str,
    honorific: &'a str,
}

impl<'a> NameCanonicalizer<'a> {
    pub fn new(registry: &'a PlayerRegistry, guest_name: &'a str, honorific: &'a str) -> Self {
        Self {
            registry,
            guest_name,
            honorific,
        }
    }

    pub fn from_settings(registry: &'a PlayerRegistry, settings: &'a MemberSettings) -> Self {
        Self::new(registry, &settings.guest_name, &settings.honorific)
    }

    pub fn guest_name(&self) -> &'a str {
        self.guest_name
    }

    /// Strips the honorific suffix and widens digits.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = match raw.strip_suffix(self.honorific) {
            Some(stripped) if !self.honorific.is_empty() && !stripped.is_empty() => stripped,
            _ => raw,
        };
        to_fullwidth_digits(trimmed)
    }

    /// First registered player, in registry order, whose alias matches the
    /// normalized name as written or in its hiragana or katakana form.
    fn find_canonical(&self, normalized: &str) -> Option<&'a str> {
        let hiragana = katakana_to_hiragana(normalized);
        let katakana = hiragana_to_katakana(normalized);
        self.registry
            .players()
            .iter()
            .find(|player| {
                player.aliases.iter().any(|alias| {
                    *alias == normalized || *alias == hiragana || *alias == katakana
                })
            })
            .map(|player| player.name.as_str())
    }

    pub fn canonicalize(&self, raw: &str, options: NameOptions) -> String {
        let normalized = self.normalize(raw);

        if !options.apply_alias_replacement {
            return normalized;
        }
        if let Some(canonical) = self.find_canonical(&normalized) {
            return canonical.to_string();
        }

        if options.substitute_unregistered {
            self.guest_name.to_string()
        } else {
            format!("{normalized}{UNREGISTERED_SUFFIX}")
        }
    }

    /// Canonical name when `raw` refers to a registered player.
    pub fn lookup(&self, raw: &str) -> Option<&'a str> {
        self.find_canonical(&self.normalize(raw))
    }

    pub fn is_registered(&self, raw: &str) -> bool {
        self.lookup(raw).is_some()
    }
}
