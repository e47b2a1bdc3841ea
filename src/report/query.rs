use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tracing::debug;

use crate::member::{NameCanonicalizer, NameOptions, UNREGISTERED_SUFFIX};
use crate::settings::ReportDefaults;
use crate::window::{TimeWindow, TimeWindowResolver, WindowError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidWindow(#[from] WindowError),
}

/// Option keywords accepted among report arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum OptionFlag {
    GuestSkip,
    GuestInclude,
    GuestDisabled,
    NoAliasReplacement,
    ScoreComparison,
    GameHistory,
    Archive,
}

impl OptionFlag {
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            OptionFlag::GuestSkip => &["ゲストなし", "ゲストナシ"],
            OptionFlag::GuestInclude => &["ゲストあり", "ゲストアリ"],
            OptionFlag::GuestDisabled => &["ゲスト無効"],
            OptionFlag::NoAliasReplacement => &["修正なし", "変換なし"],
            OptionFlag::ScoreComparison => &["比較", "点差", "差分"],
            OptionFlag::GameHistory => &["戦績"],
            OptionFlag::Archive => &["アーカイブ", "archive"],
        }
    }

    pub fn from_token(token: &str) -> Option<OptionFlag> {
        let lowered = token.to_lowercase();
        OptionFlag::iter().find(|flag| flag.tokens().contains(&lowered.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Leave out games with two or more guests.
    pub guest_skip: bool,
    pub names: NameOptions,
    /// Show the gap to the row above.
    pub score_comparisons: bool,
    /// List every game in personal reports.
    pub show_game_results: bool,
    /// Read the archived result table instead of chat messages.
    pub archive: bool,
}

impl ReportOptions {
    pub fn from_defaults(defaults: &ReportDefaults) -> Self {
        Self {
            guest_skip: defaults.guest_skip,
            names: NameOptions {
                apply_alias_replacement: defaults.apply_alias_replacement,
                substitute_unregistered: defaults.substitute_unregistered,
            },
            score_comparisons: false,
            show_game_results: false,
            archive: false,
        }
    }

    pub fn apply(&mut self, flag: OptionFlag) {
        match flag {
            OptionFlag::GuestSkip => self.guest_skip = true,
            OptionFlag::GuestInclude => self.guest_skip = false,
            OptionFlag::GuestDisabled => self.names.substitute_unregistered = false,
            OptionFlag::NoAliasReplacement => self.names.apply_alias_replacement = false,
            OptionFlag::ScoreComparison => self.score_comparisons = true,
            OptionFlag::GameHistory => self.show_game_results = true,
            OptionFlag::Archive => self.archive = true,
        }
    }
}

/// A report request after its arguments have been sorted into a window,
/// target players and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub window: TimeWindow,
    /// Canonical names in argument order, without duplicates.
    pub players: Vec<String>,
    pub options: ReportOptions,
}

impl ReportQuery {
    pub fn parse<'t>(
        args: impl IntoIterator<Item = &'t str>,
        defaults: &ReportDefaults,
        canonicalizer: &NameCanonicalizer<'_>,
        resolver: &TimeWindowResolver,
    ) -> Result<Self, QueryError> {
        let mut options = ReportOptions::from_defaults(defaults);
        let mut window_tokens = Vec::new();
        let mut name_tokens = Vec::new();

        for token in args.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
            if TimeWindowResolver::is_window_token(token) {
                window_tokens.push(token);
            } else if let Some(flag) = OptionFlag::from_token(token) {
                options.apply(flag);
            } else {
                name_tokens.push(token);
            }
        }

        let window = match resolver.resolve_tokens(window_tokens)? {
            Some(window) => window,
            None => resolver
                .resolve(Some(defaults.aggregation_range.as_str()))
                .or_else(|| resolver.resolve(None))
                .ok_or_else(|| WindowError::InvalidDate(defaults.aggregation_range.clone()))?,
        };

        let mut players: Vec<String> = Vec::new();
        for token in name_tokens {
            let Some(name) = Self::target_name(token, options.names, canonicalizer) else {
                debug!(token, "Ignoring argument that names no registered player");
                continue;
            };
            if !players.contains(&name) {
                players.push(name);
            }
        }

        Ok(Self {
            window,
            players,
            options,
        })
    }

    /// The name a target token takes in records built under `names`.
    fn target_name(
        token: &str,
        names: NameOptions,
        canonicalizer: &NameCanonicalizer<'_>,
    ) -> Option<String> {
        if !names.apply_alias_replacement {
            return Some(canonicalizer.normalize(token));
        }
        if let Some(canonical) = canonicalizer.lookup(token) {
            return Some(canonical.to_string());
        }
        (!names.substitute_unregistered)
            .then(|| format!("{}{UNREGISTERED_SUFFIX}", canonicalizer.normalize(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::PlayerRegistry;
    use crate::settings::Settings;
    use chrono::{NaiveDate, NaiveDateTime};
    use rstest::rstest;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn registry() -> PlayerRegistry {
        PlayerRegistry::from_json_str(
            r#"[{"name": "たろう", "alias": "タロ"}, {"name": "じろう", "alias": ""}]"#,
        )
        .unwrap()
    }

    fn parse(args: &[&str]) -> Result<ReportQuery, QueryError> {
        let settings = Settings::default();
        let registry = registry();
        let canonicalizer = NameCanonicalizer::from_settings(&registry, &settings.member);
        let resolver = TimeWindowResolver::new(now());
        ReportQuery::parse(args.iter().copied(), &settings.defaults, &canonicalizer, &resolver)
    }

    #[rstest]
    #[case("ゲストなし", Some(OptionFlag::GuestSkip))]
    #[case("ゲストアリ", Some(OptionFlag::GuestInclude))]
    #[case("ARCHIVE", Some(OptionFlag::Archive))]
    #[case("点差", Some(OptionFlag::ScoreComparison))]
    #[case("たろう", None)]
    fn recognizes_flags(#[case] token: &str, #[case] expected: Option<OptionFlag>) {
        assert_eq!(OptionFlag::from_token(token), expected);
    }

    #[test]
    fn defaults_without_arguments() {
        let query = parse(&[]).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(query.window, TimeWindow::from_days(today, today));
        assert!(query.players.is_empty());
        assert_eq!(query.options, ReportOptions::from_defaults(&ReportDefaults::default()));
    }

    #[test]
    fn sorts_tokens_into_window_players_and_flags() {
        let query = parse(&["先月", "タロさん", "じろう", "たろう", "ゲストあり", "戦績"]).unwrap();

        let first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        assert_eq!(query.window, TimeWindow::from_days(first, last));
        assert_eq!(query.players, vec!["たろう", "じろう"]);
        assert!(!query.options.guest_skip);
        assert!(query.options.show_game_results);
    }

    #[test]
    fn several_dates_span_earliest_to_latest() {
        let query = parse(&["20240503", "20240501"]).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert_eq!(query.window, TimeWindow::from_days(first, last));
    }

    #[test]
    fn impossible_date_is_an_error() {
        assert!(matches!(
            parse(&["20240231"]),
            Err(QueryError::InvalidWindow(WindowError::InvalidDate(_)))
        ));
    }

    #[test]
    fn unregistered_targets_follow_name_options() {
        assert!(parse(&["さぶろう"]).unwrap().players.is_empty());

        let kept = parse(&["さぶろう", "ゲスト無効"]).unwrap();
        assert_eq!(kept.players, vec![format!("さぶろう{UNREGISTERED_SUFFIX}")]);

        let raw = parse(&["タロ", "修正なし"]).unwrap();
        assert_eq!(raw.players, vec!["タロ"]);
    }
}
