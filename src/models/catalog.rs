//! Built-in catalog of story morales and illustration styles.
//!
//! When the user picks a theme or style category, a concrete entry is
//! drawn at random from that category; with no selection the draw is
//! over the whole catalog.

use rand::seq::SliceRandom;

/// Morale categories offered in the story setup screen.
pub const MORALE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "confidence",
        &[
            "It is important to believe in yourself.",
            "Being yourself is the best way to shine.",
            "Everyone has a unique talent to offer the world.",
            "Even when you are small, you can do great things.",
        ],
    ),
    (
        "friendship",
        &[
            "True friendship is a precious treasure.",
            "Helping others is a source of happiness.",
            "Together, we are stronger.",
            "Sharing makes the world more beautiful.",
        ],
    ),
    (
        "perseverance",
        &[
            "Never give up, even when things are hard.",
            "Every mistake is a chance to learn.",
            "Patience is the key to success.",
        ],
    ),
    (
        "wonder",
        &[
            "Imagination is a door to wonderful adventures.",
            "There is magic in the smallest things.",
            "Dreams can come true when you truly believe in them.",
            "Adventures often begin where you least expect them.",
        ],
    ),
];

/// Illustration style categories.
pub const STYLE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "traditional",
        &[
            "soft watercolor",
            "colored pencil drawing",
            "gentle pastel drawing",
            "childlike hand painting",
            "paper collage",
        ],
    ),
    (
        "digital",
        &[
            "colorful 2D illustration",
            "textured digital pastel",
            "soft pixel art",
            "kids flat design",
        ],
    ),
    (
        "storybook",
        &[
            "classic children's book illustration",
            "picture-book style",
            "fairy tale oil painting",
            "kawaii style",
        ],
    ),
    (
        "dreamlike",
        &[
            "enchanted pastel forest",
            "dreamy starry sky",
            "cloud kingdom",
            "joyful underwater world",
        ],
    ),
];

/// All morales, across categories.
pub fn all_morales() -> Vec<&'static str> {
    MORALE_CATEGORIES.iter().flat_map(|(_, m)| m.iter().copied()).collect()
}

/// All illustration styles, across categories.
pub fn all_styles() -> Vec<&'static str> {
    STYLE_CATEGORIES.iter().flat_map(|(_, s)| s.iter().copied()).collect()
}

/// Morales for a named category, falling back to the whole catalog
/// when the category is unknown.
pub fn morales_for(category: Option<&str>) -> Vec<&'static str> {
    lookup(MORALE_CATEGORIES, category).unwrap_or_else(all_morales)
}

/// Styles for a named category, falling back to the whole catalog.
pub fn styles_for(category: Option<&str>) -> Vec<&'static str> {
    lookup(STYLE_CATEGORIES, category).unwrap_or_else(all_styles)
}

fn lookup(
    categories: &[(&str, &[&'static str])],
    name: Option<&str>,
) -> Option<Vec<&'static str>> {
    let name = name?;
    categories
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, entries)| entries.to_vec())
}

/// Random selection from a slice. Panics on an empty slice, which the
/// catalog constants never are.
pub fn pick_random<'a, T>(items: &'a [T]) -> &'a T {
    items
        .choose(&mut rand::thread_rng())
        .expect("catalog must not be empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category_is_scoped() {
        let morales = morales_for(Some("friendship"));
        assert!(morales.contains(&"Together, we are stronger."));
        assert!(!morales.contains(&"Patience is the key to success."));
    }

    #[test]
    fn test_unknown_category_falls_back_to_all() {
        assert_eq!(morales_for(Some("nope")).len(), all_morales().len());
        assert_eq!(styles_for(None).len(), all_styles().len());
    }

    #[test]
    fn test_pick_random_stays_in_catalog() {
        let styles = all_styles();
        for _ in 0..32 {
            assert!(styles.contains(pick_random(&styles)));
        }
    }
}
