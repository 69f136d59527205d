//! Story id validation.
//!
//! Story ids become record keys (`story:{id}`) and key prefixes for every
//! content document, so they are restricted to a safe alphabet.

use crate::EnigmaError;

pub const MAX_STORY_ID_LEN: usize = 64;

fn is_valid_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validate a story id: ASCII alphanumerics, `_` or `-`, at most
/// [`MAX_STORY_ID_LEN`] characters.
pub fn validate_story_id(story_id: &str) -> Result<&str, EnigmaError> {
    if story_id.is_empty() || !story_id.chars().all(is_valid_key_char) {
        return Err(EnigmaError::Validation(format!(
            "Invalid story id '{}': must be alphanumeric with underscores or hyphens",
            story_id
        )));
    }
    if story_id.len() > MAX_STORY_ID_LEN {
        return Err(EnigmaError::Validation(format!(
            "Invalid story id '{}': longer than {} characters",
            story_id, MAX_STORY_ID_LEN
        )));
    }
    Ok(story_id)
}

/// Turn a directory name into a story id.
///
/// Lowercases, folds common accented letters, replaces everything else with
/// `-` and trims the result to [`MAX_STORY_ID_LEN`].
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let c = fold_accent(c.to_ascii_lowercase());
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let truncated: String = slug
        .trim_matches('-')
        .chars()
        .take(MAX_STORY_ID_LEN)
        .collect();
    truncated.trim_end_matches('-').to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}
