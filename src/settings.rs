use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Invalid uma list: {0}")]
    Uma(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Rank adjustment values for 1st through 4th place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UmaRepr")]
pub struct Uma(pub [f64; 4]);

#[derive(Deserialize)]
#[serde(untagged)]
enum UmaRepr {
    Csv(String),
    List(Vec<f64>),
}

impl TryFrom<UmaRepr> for Uma {
    type Error = SettingsError;

    fn try_from(repr: UmaRepr) -> Result<Self, Self::Error> {
        match repr {
            UmaRepr::Csv(text) => text.parse(),
            UmaRepr::List(values) => Uma::try_from(values.as_slice()),
        }
    }
}

impl TryFrom<&[f64]> for Uma {
    type Error = SettingsError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let values: [f64; 4] = values
            .try_into()
            .map_err(|_| SettingsError::Uma(format!("expected 4 values, got {}", values.len())))?;
        Ok(Uma(values))
    }
}

impl FromStr for Uma {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| SettingsError::Uma(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Uma::try_from(values.as_slice())
    }
}

impl Default for Uma {
    fn default() -> Self {
        Uma([30.0, 10.0, -10.0, -30.0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points dealt to each player at the start, in units of 100.
    pub base_point: i64,
    /// Points needed to break even, in units of 100.
    pub return_point: i64,
    pub uma: Uma,
    /// Sum the four raw scores of a finished game should add up to.
    pub expected_total: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_point: 250,
            return_point: 300,
            uma: Uma::default(),
            expected_total: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSettings {
    pub character_limit: usize,
    pub registration_limit: usize,
    pub alias_limit: usize,
    pub guest_name: String,
    pub honorific: String,
}

impl Default for MemberSettings {
    fn default() -> Self {
        Self {
            character_limit: 8,
            registration_limit: 255,
            alias_limit: 16,
            guest_name: "ゲスト".to_string(),
            honorific: "さん".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub keyword: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keyword: "御無礼".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    pub slots: usize,
    pub qualification_ratio: f64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            slots: 3,
            qualification_ratio: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandWords {
    pub results: String,
    pub ranking: String,
    pub versus: String,
    pub member: String,
    /// Re-reads settings and the member list from disk.
    pub reload: String,
}

impl Default for CommandWords {
    fn default() -> Self {
        Self {
            results: "御無礼成績".to_string(),
            ranking: "御無礼ランキング".to_string(),
            versus: "御無礼対戦".to_string(),
            member: "御無礼メンバー".to_string(),
            reload: "御無礼リロード".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDefaults {
    pub aggregation_range: String,
    pub guest_skip: bool,
    pub apply_alias_replacement: bool,
    pub substitute_unregistered: bool,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            aggregation_range: "当日".to_string(),
            guest_skip: true,
            apply_alias_replacement: true,
            substitute_unregistered: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scoring: ScoringConfig,
    pub member: MemberSettings,
    pub search: SearchSettings,
    pub ranking: RankingSettings,
    pub commands: CommandWords,
    pub defaults: ReportDefaults,
}

impl Settings {
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.search.keyword.trim().is_empty() {
            return Err(SettingsError::Invalid("search.keyword is empty".into()));
        }
        if self.member.guest_name.is_empty() {
            return Err(SettingsError::Invalid("member.guest_name is empty".into()));
        }
        if self.member.character_limit == 0
            || self.member.registration_limit == 0
            || self.member.alias_limit == 0
        {
            return Err(SettingsError::Invalid("member limits must be positive".into()));
        }
        if self.ranking.slots == 0 {
            return Err(SettingsError::Invalid("ranking.slots must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.ranking.qualification_ratio) {
            return Err(SettingsError::Invalid(
                "ranking.qualification_ratio must be within 0..=1".into(),
            ));
        }
        Ok(())
    }
}
