//! Resolution of player-typed names to story content.

use rapidfuzz::distance::levenshtein;

/// Minimum normalized similarity for a fuzzy match.
pub const FUZZY_CUTOFF: f64 = 0.6;

/// How a name argument was matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Found(T),
    /// Fuzzy match: the caller may echo the corrected name.
    Guessed(T),
    NotFound,
}

impl<T> Resolved<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Resolved::Found(item) | Resolved::Guessed(item) => Some(item),
            Resolved::NotFound => None,
        }
    }
}

/// Resolve `input` against `items`: 1-based number in list order, exact
/// case-insensitive name, unique name prefix, then best fuzzy match above
/// `FUZZY_CUTOFF`.
pub fn resolve<'a, T>(
    input: &str,
    items: &[&'a T],
    name: impl Fn(&T) -> &str,
) -> Resolved<&'a T> {
    let input = input.trim();
    if input.is_empty() || items.is_empty() {
        return Resolved::NotFound;
    }

    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| items.get(i)) {
            Some(item) => Resolved::Found(*item),
            None => Resolved::NotFound,
        };
    }

    let wanted = input.to_lowercase();
    if let Some(item) = items.iter().find(|i| name(i).to_lowercase() == wanted) {
        return Resolved::Found(*item);
    }

    let prefixed: Vec<&&T> = items
        .iter()
        .filter(|i| name(i).to_lowercase().starts_with(&wanted))
        .collect();
    if let [only] = prefixed.as_slice() {
        return Resolved::Found(**only);
    }

    items
        .iter()
        .map(|i| {
            let score =
                levenshtein::normalized_similarity(wanted.chars(), name(i).to_lowercase().chars());
            (score, *i)
        })
        .filter(|(score, _)| *score >= FUZZY_CUTOFF)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map_or(Resolved::NotFound, |(_, item)| Resolved::Guessed(item))
}
