//! Character-level conversions used to compare and size player names.

const HIRAGANA_START: u32 = 0x3041;
const KATAKANA_START: u32 = 0x30A1;
const KANA_SPAN: u32 = 86;
const FULLWIDTH_ZERO: u32 = 0xFF10;

fn shift(c: char, from: u32, to: u32, span: u32) -> char {
    let code = c as u32;
    if (from..from + span).contains(&code) {
        char::from_u32(code - from + to).unwrap_or(c)
    } else {
        c
    }
}

/// Converts ASCII digits to full-width digits. Other characters are untouched.
pub fn to_fullwidth_digits(text: &str) -> String {
    text.chars()
        .map(|c| shift(c, '0' as u32, FULLWIDTH_ZERO, 10))
        .collect()
}

pub fn to_halfwidth_digits(text: &str) -> String {
    text.chars()
        .map(|c| shift(c, FULLWIDTH_ZERO, '0' as u32, 10))
        .collect()
}

pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| shift(c, KATAKANA_START, HIRAGANA_START, KANA_SPAN))
        .collect()
}

pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| shift(c, HIRAGANA_START, KATAKANA_START, KANA_SPAN))
        .collect()
}

/// Columns a character occupies in a monospace listing: 2 for East Asian
/// wide, full-width and ambiguous characters, otherwise 1.
pub fn char_width(c: char) -> usize {
    let wide = matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD
    );
    let ambiguous = matches!(c as u32,
        0x00A1 | 0x00A4 | 0x00A7 | 0x00A8 | 0x00B0 | 0x00B1 | 0x00B4 | 0x00B6
        | 0x00D7 | 0x00F7
        | 0x0391..=0x03A9
        | 0x03B1..=0x03C9
        | 0x0401 | 0x0410..=0x044F | 0x0451
        | 0x2010 | 0x2013..=0x2016 | 0x2018 | 0x2019 | 0x201C | 0x201D
        | 0x2020..=0x2022 | 0x2025..=0x2027 | 0x2030 | 0x2032 | 0x2033 | 0x203B
        | 0x2190..=0x2199 | 0x2212
        | 0x2460..=0x24E9
        | 0x2500..=0x257F
        | 0x25A0..=0x25A1 | 0x25B2..=0x25B3 | 0x25B6 | 0x25BC..=0x25BD | 0x25C6..=0x25C7
        | 0x25CB | 0x25CE..=0x25D1 | 0x2605..=0x2606 | 0x2640 | 0x2642
    );
    if wide || ambiguous {
        2
    } else {
        1
    }
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Spaces needed to pad `text` out to `width` columns.
pub fn padding(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(display_width(text)))
}
