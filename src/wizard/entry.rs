//! Name and birth-year extraction from a chat entry.
//!
//! Accepts `Full Name, 1984`, `Full Name 1984` and `Full Name (1984)`.

/// Parsed chat entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Nothing was entered.
    Blank,
    /// A name and a birth year.
    Person { full_name: String, birth_year: i32 },
    /// Something was entered but it could not be read.
    Invalid { reason: String },
}

const USAGE: &str = "Please enter a full name followed by a year of birth, e.g. 'Lakshmi Rao, 1950'.";

/// Parse a raw entry.
pub fn parse_entry(raw: &str) -> Entry {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Entry::Blank;
    }

    // Separators can be multi-byte (no-break or ideographic spaces).
    let split_at = trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || c == ',')
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let (head, year_token) = trimmed.split_at(split_at);

    let year_token = year_token.trim_matches(|c| c == '(' || c == ')');
    let birth_year = match year_token.parse::<i32>() {
        Ok(year) if year_token.chars().all(|c| c.is_ascii_digit()) => year,
        _ => {
            return Entry::Invalid {
                reason: USAGE.to_string(),
            }
        }
    };

    let full_name = head
        .trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '(')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if full_name.is_empty() {
        return Entry::Invalid {
            reason: USAGE.to_string(),
        };
    }

    Entry::Person {
        full_name,
        birth_year,
    }
}
