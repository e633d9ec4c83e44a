//! Phone number search-format expansion.
//!
//! Remote servers index phone numbers however they were entered upstream, so a
//! single number is searched in every layout we have seen in the wild.

const SEPARATORS: [char; 2] = [';', ','];

/// Expand a raw phone field into candidate search values.
///
/// The input may hold several numbers separated by `;` or `,`. Ten-digit
/// numbers (or eleven with a leading `1`) expand into the known layouts;
/// anything else is passed through trimmed. Empty candidates are dropped.
pub fn expand(raw_phone: &str) -> Vec<String> {
    raw_phone
        .split(SEPARATORS)
        .flat_map(expand_one)
        .filter(|candidate| !candidate.is_empty())
        .collect()
}

fn expand_one(phone: &str) -> Vec<String> {
    let phone = phone.trim();
    match national_digits(phone) {
        Some(digits) => {
            let (area, exchange, line) = (&digits[0..3], &digits[3..6], &digits[6..10]);
            vec![
                digits.clone(),
                format!("{area}-{exchange}-{line}"),
                format!("{area} {exchange} {line}"),
                format!("({area}) {exchange}-{line}"),
                format!("({area}){exchange}-{line}"),
                format!("{area}.{exchange}.{line}"),
            ]
        }
        None => vec![phone.to_string()],
    }
}

/// The ten NANP digits of a number, if it has exactly that many.
fn national_digits(phone: &str) -> Option<String> {
    if phone.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}
