#![forbid(unsafe_code)]

use std::collections::BTreeSet;

/// Canonical tag set: trimmed, lowercased, blanks dropped, de-duplicated.
/// The BTreeSet keeps the result order-stable regardless of input order.
pub fn normalize<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    for tag in raw {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        out.insert(trimmed.to_lowercase());
    }
    out.into_iter().collect()
}

/// Split a comma-separated tag argument and normalize the pieces.
pub fn parse_csv(value: &str) -> Vec<String> {
    normalize(value.split(','))
}
