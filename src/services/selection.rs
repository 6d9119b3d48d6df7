//! Choice of the single text variant that gets embedded for a hadith.

use crate::models::{Language, TextVariants};

/// Variant preference, most preferred first.
pub const LANGUAGE_PRIORITY: [Language; 3] =
    [Language::Russian, Language::English, Language::Arabic];

/// The text chosen for embedding and the language it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedText<'a> {
    pub text: &'a str,
    pub lang: Language,
}

/// First non-empty variant in [`LANGUAGE_PRIORITY`] order, or `None` when
/// the record has no usable text and must not be embedded.
pub fn select_text(texts: &TextVariants) -> Option<SelectedText<'_>> {
    LANGUAGE_PRIORITY.iter().find_map(|&lang| {
        texts
            .get(lang)
            .filter(|text| !text.is_empty())
            .map(|text| SelectedText { text, lang })
    })
}
