//! URL slugs derived from human readable names.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("strip pattern compiles"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator pattern compiles"));

/// Decomposes `value` (NFKD) so accented letters keep their base letter,
/// lowercases it, drops anything that is not an ASCII word character,
/// whitespace or hyphen, and joins the remaining words with single hyphens.
///
/// `"HyperForge Robotic Welding Cell"` becomes `"hyperforge-robotic-welding-cell"`.
/// The result may be empty when the name has no usable characters.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let stripped = STRIP.replace_all(&ascii, "").to_lowercase();
    SEPARATORS
        .replace_all(stripped.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// `base`, `base-1`, `base-2`, ... in order; the first unused one wins.
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1..).map(move |n| format!("{}-{}", base, n)))
}

/// Whether `value` is already in slug form.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty() && slugify(value) == value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenates_words() {
        assert_eq!(
            slugify("HyperForge Robotic Welding Cell"),
            "hyperforge-robotic-welding-cell"
        );
        assert_eq!(slugify("AquaPure CIP Skid 4.0"), "aquapure-cip-skid-40");
    }

    #[test]
    fn strips_punctuation_and_collapses_separators() {
        assert_eq!(slugify("  Food & Beverage "), "food-beverage");
        assert_eq!(slugify("Automotive -- EV"), "automotive-ev");
        assert_eq!(slugify("_snake_case_"), "snake_case");
    }

    #[test]
    fn transliterates_accents_and_drops_the_rest() {
        assert_eq!(slugify("Café Línea"), "cafe-linea");
        assert_eq!(slugify("Crème Brûlée Line"), "creme-brulee-line");
        assert_eq!(slugify("ﬁne Press"), "fine-press");
        assert_eq!(slugify("北京 Press"), "press");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn candidate_sequence() {
        let first: Vec<String> = candidates("press").take(3).collect();
        assert_eq!(first, ["press", "press-1", "press-2"]);
    }

    #[test]
    fn recognises_existing_slugs() {
        assert!(is_slug("solar-glass-laminator"));
        assert!(!is_slug("Solar Glass"));
        assert!(!is_slug(""));
    }
}
