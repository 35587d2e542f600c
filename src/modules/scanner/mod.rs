//! Classification of scanned or typed input.
//!
//! Barcode scanners emit bare ISBN-13s, people type hyphenated ISBN-10s, and
//! anything that fails a check digit is treated as a title.

use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Isbn13(String),
    /// A valid ISBN-10 and its ISBN-13 equivalent
    Isbn10 { isbn10: String, isbn13: String },
    /// Free text. Title lookups need a companion author.
    Title(String),
}

impl ScanInput {
    pub fn isbn13(&self) -> Option<&str> {
        match self {
            ScanInput::Isbn13(isbn13) | ScanInput::Isbn10 { isbn13, .. } => Some(isbn13),
            ScanInput::Title(_) => None,
        }
    }
}

pub fn classify(raw: &str) -> ScanInput {
    match normalize_isbn(raw) {
        Ok(ScanInput::Title(_)) | Err(_) => ScanInput::Title(raw.trim().to_string()),
        Ok(isbn) => isbn,
    }
}

/// Validate `raw` as an ISBN.
///
/// Returns `Ok(ScanInput::Title)` when the input does not have the shape of an
/// ISBN at all, and `InvalidIdentifier` when it does but the check digit is wrong.
pub fn normalize_isbn(raw: &str) -> Result<ScanInput, DomainError> {
    let candidate = compact(raw);

    if candidate.len() == 13 && candidate.bytes().all(|b| b.is_ascii_digit()) {
        if is_valid_isbn13(&candidate) {
            return Ok(ScanInput::Isbn13(candidate));
        }
        return Err(DomainError::InvalidIdentifier(raw.trim().to_string()));
    }

    if has_isbn10_shape(&candidate) {
        return match isbn10_to_isbn13(&candidate) {
            Some(isbn13) => Ok(ScanInput::Isbn10 {
                isbn10: candidate,
                isbn13,
            }),
            None => Err(DomainError::InvalidIdentifier(raw.trim().to_string())),
        };
    }

    Ok(ScanInput::Title(raw.trim().to_string()))
}

/// Strip hyphens and whitespace, upper-casing a trailing `x` check character.
pub fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn has_isbn10_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[..9].iter().all(u8::is_ascii_digit)
        && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
}

pub fn is_valid_isbn13(s: &str) -> bool {
    if s.len() != 13 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = s
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    sum % 10 == 0
}

pub fn is_valid_isbn10(s: &str) -> bool {
    if !has_isbn10_shape(s) {
        return false;
    }
    let sum: u32 = s
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let value = if b == b'X' { 10 } else { u32::from(b - b'0') };
            value * (10 - i as u32)
        })
        .sum();
    sum % 11 == 0
}

pub fn isbn10_to_isbn13(isbn10: &str) -> Option<String> {
    let isbn10 = compact(isbn10);
    if !is_valid_isbn10(&isbn10) {
        return None;
    }
    let body = format!("978{}", &isbn10[..9]);
    let check = isbn13_check_digit(&body);
    Some(format!("{}{}", body, check))
}

/// Only 978-prefixed ISBN-13s have an ISBN-10 form.
pub fn isbn13_to_isbn10(isbn13: &str) -> Option<String> {
    let isbn13 = compact(isbn13);
    if !is_valid_isbn13(&isbn13) || !isbn13.starts_with("978") {
        return None;
    }
    let body = &isbn13[3..12];
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * (10 - i as u32))
        .sum();
    let check = match (11 - sum % 11) % 11 {
        10 => 'X',
        n => char::from_digit(n, 10)?,
    };
    Some(format!("{}{}", body, check))
}

fn isbn13_check_digit(body: &str) -> u32 {
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    (10 - sum % 10) % 10
}
