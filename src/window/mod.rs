//! Report windows aligned to the noon game-day boundary.
//!
//! A game day runs from 12:00 to 11:59:59.999999 the next morning, so play
//! that continues past midnight is attributed to the day it started.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

pub const BOUNDARY_HOUR: u32 = 12;
pub const LOOKBACK_DAYS: i64 = 91;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("「{0}」は日付として解釈できません。")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum WindowKeyword {
    GameDay,
    Today,
    Yesterday,
    ThisMonth,
    LastMonth,
    MonthBeforeLast,
    ThisYear,
    LastYear,
    YearBeforeLast,
    All,
    First,
}

impl WindowKeyword {
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            WindowKeyword::GameDay => &["当日"],
            WindowKeyword::Today => &["今日"],
            WindowKeyword::Yesterday => &["昨日"],
            WindowKeyword::ThisMonth => &["今月"],
            WindowKeyword::LastMonth => &["先月"],
            WindowKeyword::MonthBeforeLast => &["先々月"],
            WindowKeyword::ThisYear => &["今年"],
            WindowKeyword::LastYear => &["去年", "昨年"],
            WindowKeyword::YearBeforeLast => &["一昨年"],
            WindowKeyword::All => &["全部"],
            WindowKeyword::First => &["最初"],
        }
    }
}

impl FromStr for WindowKeyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowKeyword::iter()
            .find(|keyword| keyword.tokens().contains(&s))
            .ok_or(())
    }
}

impl fmt::Display for WindowKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens()[0])
    }
}

/// Report interval. Both ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Window covering the game days `first` through `last`.
    pub fn from_days(first: NaiveDate, last: NaiveDate) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        let noon = NaiveTime::from_hms_opt(BOUNDARY_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
        let before_noon = NaiveTime::from_hms_micro_opt(BOUNDARY_HOUR - 1, 59, 59, 999_999)
            .unwrap_or(NaiveTime::MIN);
        let after_last = last.succ_opt().unwrap_or(last);

        Self {
            start: first.and_time(noon),
            end: after_last.and_time(before_noon),
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start < timestamp && timestamp < self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Game day a moment belongs to.
pub fn game_day(moment: NaiveDateTime) -> NaiveDate {
    (moment - Duration::hours(i64::from(BOUNDARY_HOUR))).date()
}

fn month_bounds(day: NaiveDate, months_back: u32) -> Option<[NaiveDate; 2]> {
    let first = day
        .with_day(1)?
        .checked_sub_months(Months::new(months_back))?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some([first, last])
}

fn year_bounds(year: i32) -> Option<[NaiveDate; 2]> {
    Some([
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ])
}

fn parse_date_token(token: &str) -> Option<Result<NaiveDate, WindowError>> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let invalid = || WindowError::InvalidDate(token.to_string());
    let date = (|| {
        let year = token[0..4].parse().ok()?;
        let month = token[4..6].parse().ok()?;
        let day = token[6..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })();
    Some(date.ok_or_else(invalid))
}

/// Resolves window keywords relative to a fixed "now".
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowResolver {
    now: NaiveDateTime,
}

impl TimeWindowResolver {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Window for a single keyword, or the current game day without one.
    /// Unknown keywords and impossible dates give `None`.
    pub fn resolve(&self, keyword: Option<&str>) -> Option<TimeWindow> {
        match keyword {
            None => {
                let today = game_day(self.now);
                Some(TimeWindow::from_days(today, today))
            }
            Some(token) => {
                let days = self.days_for(token)?.ok()?;
                Self::span_days(&days)
            }
        }
    }

    /// Window spanning every day named by `tokens`. Tokens that are not
    /// window keywords are ignored; `Ok(None)` means none were present.
    pub fn resolve_tokens<'t>(
        &self,
        tokens: impl IntoIterator<Item = &'t str>,
    ) -> Result<Option<TimeWindow>, WindowError> {
        let mut days = Vec::new();
        for token in tokens {
            if let Some(resolved) = self.days_for(token) {
                days.extend(resolved?);
            }
        }
        Ok(Self::span_days(&days))
    }

    /// True when `token` names a window, valid or not.
    pub fn is_window_token(token: &str) -> bool {
        parse_date_token(token).is_some() || token.parse::<WindowKeyword>().is_ok()
    }

    fn span_days(days: &[NaiveDate]) -> Option<TimeWindow> {
        let first = days.iter().min()?;
        let last = days.iter().max()?;
        Some(TimeWindow::from_days(*first, *last))
    }

    fn days_for(&self, token: &str) -> Option<Result<Vec<NaiveDate>, WindowError>> {
        if let Some(date) = parse_date_token(token) {
            return Some(date.map(|d| vec![d]));
        }

        let keyword: WindowKeyword = token.parse().ok()?;
        let current = game_day(self.now);
        let today = self.now.date();
        let lookback = current - Duration::days(LOOKBACK_DAYS);

        let days = match keyword {
            WindowKeyword::GameDay => vec![current],
            WindowKeyword::Today => vec![today],
            WindowKeyword::Yesterday => today.pred_opt().into_iter().collect(),
            WindowKeyword::ThisMonth => month_bounds(current, 0).map(Vec::from)?,
            WindowKeyword::LastMonth => month_bounds(current, 1).map(Vec::from)?,
            WindowKeyword::MonthBeforeLast => month_bounds(current, 2).map(Vec::from)?,
            WindowKeyword::ThisYear => year_bounds(today.year()).map(Vec::from)?,
            WindowKeyword::LastYear => year_bounds(today.year() - 1).map(Vec::from)?,
            WindowKeyword::YearBeforeLast => year_bounds(today.year() - 2).map(Vec::from)?,
            WindowKeyword::All => vec![lookback, current + Duration::days(1)],
            WindowKeyword::First => vec![lookback],
        };
        Some(Ok(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn end_of(y: i32, m: u32, d: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_micro_opt(11, 59, 59, 999_999).unwrap()
    }

    #[test]
    fn default_before_noon_is_yesterday() {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 9, 30));
        let window = resolver.resolve(None).unwrap();
        assert_eq!(window.start, at(2024, 3, 9, 12, 0));
        assert_eq!(window.end, end_of(2024, 3, 10));
    }

    #[test]
    fn default_after_noon_is_today() {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        let window = resolver.resolve(None).unwrap();
        assert_eq!(window.start, at(2024, 3, 10, 12, 0));
        assert_eq!(window.end, end_of(2024, 3, 11));
    }

    #[test]
    fn date_token_covers_that_game_day() {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        let window = resolver.resolve(Some("20240229")).unwrap();
        assert_eq!(window.start, at(2024, 2, 29, 12, 0));
        assert_eq!(window.end, end_of(2024, 3, 1));
    }

    #[rstest]
    #[case("20230229")]
    #[case("20241301")]
    #[case("20240100")]
    fn impossible_dates_give_no_window(#[case] token: &str) {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        assert_eq!(resolver.resolve(Some(token)), None);
        assert_eq!(
            resolver.resolve_tokens([token]),
            Err(WindowError::InvalidDate(token.to_string()))
        );
    }

    #[test]
    fn unknown_keyword_gives_no_window() {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        assert_eq!(resolver.resolve(Some("来月")), None);
    }

    #[rstest]
    #[case("今月", day(2024, 3, 1), day(2024, 3, 31))]
    #[case("先月", day(2024, 2, 1), day(2024, 2, 29))]
    #[case("先々月", day(2024, 1, 1), day(2024, 1, 31))]
    #[case("今年", day(2024, 1, 1), day(2024, 12, 31))]
    #[case("昨年", day(2023, 1, 1), day(2023, 12, 31))]
    #[case("一昨年", day(2022, 1, 1), day(2022, 12, 31))]
    #[case("昨日", day(2024, 3, 9), day(2024, 3, 9))]
    fn keyword_ranges(#[case] token: &str, #[case] first: NaiveDate, #[case] last: NaiveDate) {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        assert_eq!(
            resolver.resolve(Some(token)),
            Some(TimeWindow::from_days(first, last))
        );
    }

    #[test]
    fn month_uses_game_day_on_first_morning() {
        // 1 April before noon still belongs to the 31 March game day
        let resolver = TimeWindowResolver::new(at(2024, 4, 1, 2, 0));
        let window = resolver.resolve(Some("今月")).unwrap();
        assert_eq!(window, TimeWindow::from_days(day(2024, 3, 1), day(2024, 3, 31)));
    }

    #[rstest]
    #[case(at(2024, 3, 10, 15, 0))]
    #[case(at(2024, 3, 10, 11, 59))]
    #[case(at(2024, 1, 1, 0, 0))]
    fn all_reaches_back_and_covers_now(#[case] now: NaiveDateTime) {
        let resolver = TimeWindowResolver::new(now);
        let window = resolver.resolve(Some("全部")).unwrap();
        assert!(window.span() >= Duration::days(LOOKBACK_DAYS));
        assert!(window.end >= now);
        assert!(window.contains(now));
    }

    #[test]
    fn tokens_combine_into_one_span() {
        let resolver = TimeWindowResolver::new(at(2024, 3, 10, 15, 0));
        let window = resolver
            .resolve_tokens(["20240301", "たろう", "20240305"])
            .unwrap()
            .unwrap();
        assert_eq!(window, TimeWindow::from_days(day(2024, 3, 1), day(2024, 3, 5)));
        assert_eq!(resolver.resolve_tokens(["たろう"]), Ok(None));
    }

    #[test]
    fn boundaries_are_exclusive() {
        let window = TimeWindow::from_days(day(2024, 3, 1), day(2024, 3, 1));
        assert!(!window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.contains(at(2024, 3, 2, 1, 0)));
        assert!(!window.contains(at(2024, 3, 2, 12, 0)));
    }

    #[test]
    fn keyword_tokens_round_trip() {
        for keyword in WindowKeyword::iter() {
            for token in keyword.tokens() {
                assert_eq!(token.parse::<WindowKeyword>(), Ok(keyword));
            }
        }
        assert_eq!(WindowKeyword::LastYear.to_string(), "去年");
    }
}
