use thiserror::Error;

use crate::report::query::OptionFlag;
use crate::window::WindowKeyword;

use super::service::MemberAction;
use super::text::{display_width, to_halfwidth_digits};

const FORBIDDEN_SYMBOLS: &[char] = &[
    '\\', ';', ':', '<', '>', ',', '!', '@', '#', '*', '?', '/', '`', '"', '\'',
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is empty")]
    Empty,

    #[error("name is wider than {limit} columns")]
    TooLong { limit: usize },

    #[error("name looks like a guest marker or a number")]
    ReservedPattern,

    #[error("name collides with a command keyword")]
    ReservedKeyword,

    #[error("name contains the forbidden symbol {0:?}")]
    ForbiddenSymbol(char),

    #[error("name equals the guest marker")]
    GuestName,

    #[error("name contains non-printable characters")]
    NonPrintable,
}

/// Limits applied to names at registration time.
#[derive(Debug, Clone, Copy)]
pub struct NameRules<'a> {
    pub character_limit: usize,
    pub guest_name: &'a str,
}

fn is_printable(c: char) -> bool {
    c == ' ' || !(c.is_control() || c.is_whitespace())
}

pub fn validate_name(name: &str, rules: &NameRules<'_>) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }
    if display_width(name) > rules.character_limit {
        return Err(ValidationError::TooLong {
            limit: rules.character_limit,
        });
    }

    if name == rules.guest_name {
        return Err(ValidationError::GuestName);
    }
    let halfwidth = to_halfwidth_digits(name);
    if halfwidth.starts_with(rules.guest_name) || halfwidth.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::ReservedPattern);
    }
    if name.parse::<WindowKeyword>().is_ok()
        || OptionFlag::from_token(name).is_some()
        || MemberAction::from_token(name).is_some()
    {
        return Err(ValidationError::ReservedKeyword);
    }
    if let Some(symbol) = name.chars().find(|c| FORBIDDEN_SYMBOLS.contains(c)) {
        return Err(ValidationError::ForbiddenSymbol(symbol));
    }
    if !name.chars().all(is_printable) {
        return Err(ValidationError::NonPrintable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RULES: NameRules<'static> = NameRules {
        character_limit: 8,
        guest_name: "ゲスト",
    };

    #[rstest]
    #[case("たろう")]
    #[case("Taro")]
    #[case("じろう２")]
    #[case("a b")]
    fn accepts_ordinary_names(#[case] name: &str) {
        assert_eq!(validate_name(name, &RULES), Ok(()));
    }

    #[rstest]
    #[case("", ValidationError::Empty)]
    #[case("たろうたろう", ValidationError::TooLong { limit: 8 })]
    #[case("ゲスト２", ValidationError::ReservedPattern)]
    #[case("１２３", ValidationError::ReservedPattern)]
    #[case("42", ValidationError::ReservedPattern)]
    #[case("今月", ValidationError::ReservedKeyword)]
    #[case("全部", ValidationError::ReservedKeyword)]
    #[case("戦績", ValidationError::ReservedKeyword)]
    #[case("修正なし", ValidationError::ReservedKeyword)]
    #[case("archive", ValidationError::ReservedKeyword)]
    #[case("追加", ValidationError::ReservedKeyword)]
    #[case("ta;ro", ValidationError::ForbiddenSymbol(';'))]
    #[case("@taro", ValidationError::ForbiddenSymbol('@'))]
    #[case("ta\tro", ValidationError::NonPrintable)]
    fn rejects_invalid_names(#[case] name: &str, #[case] expected: ValidationError) {
        assert_eq!(validate_name(name, &RULES), Err(expected));
    }

    #[test]
    fn exact_guest_name_is_rejected() {
        let rules = NameRules {
            character_limit: 8,
            guest_name: "guest",
        };
        assert_eq!(validate_name("guest", &rules), Err(ValidationError::GuestName));
        assert_eq!(
            validate_name("guest2", &rules),
            Err(ValidationError::ReservedPattern)
        );
    }
}
