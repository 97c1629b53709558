//! Case conversion and singularization helpers used for generated names.
//!
//! Route segments and field names arrive as `snake_case`, `kebab-case` or
//! `camelCase`; OpenAPI output needs human-readable headlines ("User Profiles"),
//! `StudlyCase` schema names and singular resource names.

use convert_case::{Boundary, Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;

/// Word boundaries of route segments and field names. Digits stay attached
/// to the preceding word, so `v1` is one word.
const BOUNDARIES: &[Boundary] = &[
    Boundary::Underscore,
    Boundary::Hyphen,
    Boundary::Space,
    Boundary::LowerUpper,
    Boundary::DigitUpper,
];

fn convert(s: &str, case: Case) -> String {
    s.with_boundaries(BOUNDARIES).to_case(case)
}

/// Convert to a space separated, capitalized headline.
///
/// ```
/// use openapi_from_routes::inflector::headline;
///
/// assert_eq!(headline("user_profiles"), "User Profiles");
/// assert_eq!(headline("createdAt"), "Created At");
/// assert_eq!(headline("order-items"), "Order Items");
/// ```
pub fn headline(s: &str) -> String {
    // dotted field paths (`filter.name`) read as separate words
    convert(&s.replace('.', " "), Case::Title)
}

/// Convert to `snake_case`.
///
/// ```
/// use openapi_from_routes::inflector::snake;
///
/// assert_eq!(snake("UserProfiles"), "user_profiles");
/// assert_eq!(snake("order-items"), "order_items");
/// ```
pub fn snake(s: &str) -> String {
    convert(s, Case::Snake)
}

/// Convert to `StudlyCase`.
pub fn studly(s: &str) -> String {
    convert(s, Case::Pascal)
}

/// Convert to `camelCase`.
pub fn camel(s: &str) -> String {
    convert(s, Case::Camel)
}

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("criteria", "criterion"),
    ("indices", "index"),
    ("oxen", "ox"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "media",
    "metadata",
    "data",
    "feedback",
    "settings",
];

/// Suffix rules applied to a single word, first match wins.
static SINGULAR_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // -as / -us nouns whose plural adds -es
        (r"(?i)^(alias|atlas|bias|canvas|gas|status)(es)?$", "$1"),
        (r"(?i)^(b|omnib|camp|bon|cens|corp|nex|prospect|surpl|syllab|vir)(us)(es)?$", "$1$2"),
        (r"(?i)(quiz)zes$", "$1"),
        (r"(?i)(matr)ices$", "${1}ix"),
        (r"(?i)(vert)ices$", "${1}ex"),
        (r"(?i)^(analy|diagno|parenthe|progno|synop|the|hypothe|cri|oa|empha)ses$", "${1}sis"),
        (r"(?i)(cache|niche|avalanche|headache|moustache|mustache)s$", "$1"),
        (r"(?i)(x|ch|ss|sh|zz|tz)es$", "$1"),
        // -ie nouns whose plural looks like -y + ies
        (
            r"(?i)(movie|cookie|zombie|calorie|brownie|rookie|selfie|smoothie|goalie|prairie|freebie|newbie|hoodie|pixie|necktie|^pie|^tie|^lie|^die)s$",
            "$1",
        ),
        (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
        (r"(?i)(wol|shel|hal|cal|sel|thie|loa|lea|scar|dwar|whar)ves$", "${1}f"),
        (r"(?i)(kni|^wi|^li)ves$", "${1}fe"),
        (r"(?i)(her|potat|tomat|ech|torped|vet)oes$", "${1}o"),
        (r"(?i)(ss|us|is)$", "$1"),
        (r"(?i)(.)s$", "$1"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Singularize the last word of an English `snake_case` noun.
///
/// ```
/// use openapi_from_routes::inflector::singular;
///
/// assert_eq!(singular("users"), "user");
/// assert_eq!(singular("categories"), "category");
/// assert_eq!(singular("order_items"), "order_item");
/// assert_eq!(singular("people"), "person");
/// assert_eq!(singular("movies"), "movie");
/// ```
pub fn singular(s: &str) -> String {
    let (prefix, last) = match s.rfind('_') {
        Some(idx) => (&s[..=idx], &s[idx + 1..]),
        None => ("", s),
    };

    format!("{}{}", prefix, singular_word(last))
}

fn singular_word(word: &str) -> String {
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return single.to_string();
    }

    SINGULAR_RULES
        .iter()
        .find(|(rule, _)| rule.is_match(word))
        .map(|(rule, replacement)| rule.replace(word, *replacement).into_owned())
        .unwrap_or_else(|| word.to_string())
}
