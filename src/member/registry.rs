use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::MemberSettings;

use super::text::{katakana_to_hiragana, to_fullwidth_digits};
use super::validation::{validate_name, NameRules, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("「{0}」は命名規則に違反しているので登録できません。({1})")]
    Validation(String, ValidationError),

    #[error("「{0}」はすでに登録されています。")]
    AlreadyRegistered(String),

    #[error("「{0}」は登録されていません。")]
    NotRegistered(String),

    #[error("「{player}」に「{alias}」は登録されていません。")]
    AliasNotFound { player: String, alias: String },

    #[error("登録上限({0}人)を超えています。")]
    RegistrationLimit(usize),

    #[error("「{player}」の別名は登録上限({limit}件)を超えています。")]
    AliasLimit { player: String, limit: usize },
}

/// A registered player. The canonical name is always its own first alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub aliases: Vec<String>,
}

impl Player {
    fn new(name: String) -> Self {
        Self {
            aliases: vec![name.clone()],
            name,
        }
    }
}

/// Persisted form of one player: the name plus a comma-joined alias list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSection {
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RegistryLimits<'a> {
    pub registration_limit: usize,
    pub alias_limit: usize,
    pub rules: NameRules<'a>,
}

impl<'a> RegistryLimits<'a> {
    pub fn from_settings(settings: &'a MemberSettings) -> Self {
        Self {
            registration_limit: settings.registration_limit,
            alias_limit: settings.alias_limit,
            rules: NameRules {
                character_limit: settings.character_limit,
                guest_name: &settings.guest_name,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasRemoval {
    AliasRemoved,
    PlayerRemoved,
}

/// Canonical players in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from persisted sections. Duplicate players and
    /// aliases an earlier player already owns, up to kana, are dropped.
    pub fn from_sections(sections: impl IntoIterator<Item = MemberSection>) -> Self {
        let mut registry = Self::new();

        for section in sections {
            let name = section.name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            if registry.kana_owner_of(&name).is_some() {
                warn!(player = %name, "Skipping duplicate player section");
                continue;
            }

            let mut player = Player::new(name);
            for alias in section.alias.split(',').map(str::trim) {
                if alias.is_empty() || player.aliases.iter().any(|a| a == alias) {
                    continue;
                }
                if let Some(owner) = registry.kana_owner_of(alias) {
                    warn!(
                        player = %player.name,
                        alias = %alias,
                        owner = %owner.name,
                        "Skipping alias already owned by another player"
                    );
                    continue;
                }
                player.aliases.push(alias.to_string());
            }
            registry.players.push(player);
        }

        info!(players = registry.players.len(), "Loaded player registry");
        registry
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let sections: Vec<MemberSection> = serde_json::from_str(text)?;
        Ok(Self::from_sections(sections))
    }

    pub fn to_sections(&self) -> Vec<MemberSection> {
        self.players
            .iter()
            .map(|player| MemberSection {
                name: player.name.clone(),
                alias: player.aliases.join(","),
            })
            .collect()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Player owning `alias` verbatim.
    pub fn owner_of(&self, alias: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.name == alias || player.aliases.iter().any(|a| a == alias))
    }

    /// Player owning an alias equal to `alias` once both are folded to
    /// hiragana. No two players may share such an alias.
    pub fn kana_owner_of(&self, alias: &str) -> Option<&Player> {
        let folded = katakana_to_hiragana(alias);
        self.players.iter().find(|player| {
            player.name == alias
                || player
                    .aliases
                    .iter()
                    .any(|a| *a == alias || katakana_to_hiragana(a) == folded)
        })
    }

    pub fn add_player(
        &mut self,
        name: &str,
        limits: &RegistryLimits<'_>,
    ) -> Result<String, RegistryError> {
        let name = to_fullwidth_digits(name.trim());

        if self.kana_owner_of(&name).is_some() {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        if self.players.len() >= limits.registration_limit {
            return Err(RegistryError::RegistrationLimit(limits.registration_limit));
        }
        validate_name(&name, &limits.rules)
            .map_err(|reason| RegistryError::Validation(name.clone(), reason))?;

        self.players.push(Player::new(name.clone()));
        info!(player = %name, "Registered player");
        Ok(name)
    }

    pub fn add_alias(
        &mut self,
        name: &str,
        alias: &str,
        limits: &RegistryLimits<'_>,
    ) -> Result<(String, String), RegistryError> {
        let name = to_fullwidth_digits(name.trim());
        let alias = to_fullwidth_digits(alias.trim());

        let taken = self.owner_of(&alias).is_some()
            || self
                .kana_owner_of(&alias)
                .is_some_and(|owner| owner.name != name);
        if taken {
            return Err(RegistryError::AlreadyRegistered(alias));
        }
        validate_name(&alias, &limits.rules)
            .map_err(|reason| RegistryError::Validation(alias.clone(), reason))?;

        let player = self
            .players
            .iter_mut()
            .find(|player| player.name == name)
            .ok_or_else(|| RegistryError::NotRegistered(name.clone()))?;

        if player.aliases.len() >= limits.alias_limit {
            return Err(RegistryError::AliasLimit {
                player: name,
                limit: limits.alias_limit,
            });
        }

        player.aliases.push(alias.clone());
        info!(player = %name, alias = %alias, "Registered alias");
        Ok((name, alias))
    }

    pub fn remove_player(&mut self, name: &str) -> Result<Player, RegistryError> {
        let name = to_fullwidth_digits(name.trim());
        let index = self
            .players
            .iter()
            .position(|player| player.name == name)
            .ok_or_else(|| RegistryError::NotRegistered(name.clone()))?;

        info!(player = %name, "Removed player");
        Ok(self.players.remove(index))
    }

    /// Removes one alias. Removing the canonical name removes the player.
    pub fn remove_alias(&mut self, name: &str, alias: &str) -> Result<AliasRemoval, RegistryError> {
        let name = to_fullwidth_digits(name.trim());
        let alias = to_fullwidth_digits(alias.trim());

        if name == alias {
            self.remove_player(&name)?;
            return Ok(AliasRemoval::PlayerRemoved);
        }

        let player = self
            .players
            .iter_mut()
            .find(|player| player.name == name)
            .ok_or_else(|| RegistryError::NotRegistered(name.clone()))?;

        let position = player
            .aliases
            .iter()
            .position(|a| *a == alias)
            .ok_or_else(|| RegistryError::AliasNotFound {
                player: name.clone(),
                alias: alias.clone(),
            })?;

        player.aliases.remove(position);
        info!(player = %name, alias = %alias, "Removed alias");
        Ok(AliasRemoval::AliasRemoved)
    }
}
