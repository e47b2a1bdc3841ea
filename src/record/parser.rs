use regex::Regex;

use super::RecordError;

/// A name token followed by a signed integer token.
const PAIR: &str = r"([^0-9+\-]+)([+\-]?[0-9]+)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSeat {
    pub name: String,
    pub score_text: String,
}

/// Detects game reports of the shape `<keyword><name><score>x4` or
/// `<name><score>x4<keyword>` in chat text.
#[derive(Debug, Clone)]
pub struct MessageParser {
    keyword: String,
    leading: Regex,
    trailing: Regex,
}

impl MessageParser {
    pub fn new(keyword: &str) -> Result<Self, RecordError> {
        let escaped = regex::escape(keyword);
        let pairs = PAIR.repeat(4);
        let leading = Regex::new(&format!("^{escaped}{pairs}$"))?;
        let trailing = Regex::new(&format!("^{pairs}{escaped}$"))?;

        Ok(Self {
            keyword: keyword.to_string(),
            leading,
            trailing,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns the four `(name, score)` pairs in seat order, or `None` when
    /// the text is not a game report.
    pub fn parse(&self, text: &str) -> Option<[ParsedSeat; 4]> {
        let compact: String = text
            .split_whitespace()
            .collect::<String>()
            .replace('\u{2212}', "-");

        let captures = self
            .leading
            .captures(&compact)
            .or_else(|| self.trailing.captures(&compact))?;

        let seat = |n: usize| ParsedSeat {
            name: captures[2 * n + 1].to_string(),
            score_text: captures[2 * n + 2].to_string(),
        };
        Some([seat(0), seat(1), seat(2), seat(3)])
    }
}

/// Parses a score token: an optional sign followed by ASCII digits. Values
/// outside the `i32` range are rejected.
pub fn parse_score(text: &str) -> Result<i64, RecordError> {
    let digits = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::InvalidScore(text.to_string()));
    }

    text.parse::<i32>()
        .map(i64::from)
        .map_err(|_| RecordError::InvalidScore(text.to_string()))
}
