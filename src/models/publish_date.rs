//! Heuristic parsing of catalog publish dates.
//!
//! Catalogs report a bare year ("2019"), a year and month ("2019-06"), an ISO date
//! or a prose date ("Jun 06, 2023"). Anything else is kept verbatim as
//! [`PublishDate::Unparseable`].

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishDate {
    FullDate(NaiveDate),
    YearMonth { year: i32, month: u32 },
    YearOnly(i32),
    Unparseable(String),
}

/// Sort key for publish dates. Every dated value orders before `Undated`.
///
/// Missing components compare as zero, so "2024" sorts before "2024-01-01".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateSortKey {
    Dated { year: i32, month: u32, day: u32 },
    Undated,
}

const FULL_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%B %Y", "%b %Y", "%B, %Y"];

impl PublishDate {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();

        for fmt in FULL_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
                return PublishDate::FullDate(date);
            }
        }

        // chrono cannot build a NaiveDate without a day, so pin it to the 1st
        let with_day = format!("{} 01", text);
        for fmt in YEAR_MONTH_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&with_day, &format!("{} %d", fmt)) {
                return PublishDate::YearMonth {
                    year: date.year(),
                    month: date.month(),
                };
            }
        }

        match leading_year(text) {
            Some(year) => PublishDate::YearOnly(year),
            None => PublishDate::Unparseable(raw.to_string()),
        }
    }

    pub fn sort_key(&self) -> DateSortKey {
        match self {
            PublishDate::FullDate(date) => DateSortKey::Dated {
                year: date.year(),
                month: date.month(),
                day: date.day(),
            },
            PublishDate::YearMonth { year, month } => DateSortKey::Dated {
                year: *year,
                month: *month,
                day: 0,
            },
            PublishDate::YearOnly(year) => DateSortKey::Dated {
                year: *year,
                month: 0,
                day: 0,
            },
            PublishDate::Unparseable(_) => DateSortKey::Undated,
        }
    }

    /// Number of known components: 3 for a full date down to 0 for unparseable.
    pub fn precision(&self) -> u8 {
        match self {
            PublishDate::FullDate(_) => 3,
            PublishDate::YearMonth { .. } => 2,
            PublishDate::YearOnly(_) => 1,
            PublishDate::Unparseable(_) => 0,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, PublishDate::Unparseable(_))
    }
}

/// Four leading digits not followed by a fifth: "1999", "1999?", "c1999", "[1999]".
fn leading_year(text: &str) -> Option<i32> {
    let text = text.trim_start_matches(['c', '©', '[', '(']);
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    digits.parse().ok()
}
