//! Hadith records and the collections that own them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a hadith text variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Primary language, the original Arabic text
    #[serde(rename = "ar")]
    Arabic,
    /// Secondary language, preferred for embedding
    #[serde(rename = "ru")]
    Russian,
    /// Tertiary language
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::Russian => "ru",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ar" => Ok(Language::Arabic),
            "ru" => Ok(Language::Russian),
            "en" => Ok(Language::English),
            _ => Err(format!("unknown language: {}", s)),
        }
    }
}

/// Corpus collection as named in an upload, e.g. `bukhari`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
}

impl CollectionRef {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }
}

/// A hadith as submitted in an upload document.
///
/// Missing fields decode as empty; empty strings are normalized to absent
/// when converted into a [`NewHadith`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HadithInput {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub text_ar: String,
    #[serde(default)]
    pub text_ru: String,
    #[serde(default)]
    pub text_en: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Bulk upload: one collection and the hadiths to add to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadDocument {
    #[serde(default)]
    pub collection: CollectionRef,
    #[serde(default)]
    pub hadiths: Vec<HadithInput>,
}

/// Up to three language variants of a hadith body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextVariants {
    pub ar: Option<String>,
    pub ru: Option<String>,
    pub en: Option<String>,
}

impl TextVariants {
    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Arabic => self.ar.as_deref(),
            Language::Russian => self.ru.as_deref(),
            Language::English => self.en.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ar.is_none() && self.ru.is_none() && self.en.is_none()
    }
}

/// A hadith ready to be written to the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHadith {
    pub number: String,
    pub texts: TextVariants,
    pub grade: Option<String>,
    pub topics: Vec<String>,
}

impl From<HadithInput> for NewHadith {
    fn from(input: HadithInput) -> Self {
        Self {
            number: input.number,
            texts: TextVariants {
                ar: non_empty(input.text_ar),
                ru: non_empty(input.text_ru),
                en: non_empty(input.text_en),
            },
            grade: non_empty(input.grade),
            topics: input.topics,
        }
    }
}

/// A hadith after insertion, carrying its generated row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredHadith {
    pub id: i64,
    pub collection_id: i64,
    pub hadith: NewHadith,
}

/// Counters reported by an ingestion run, also attached to its errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestProgress {
    pub inserted_count: usize,
    pub embedded_count: usize,
}

/// Empty strings mean "no value"; anything else, whitespace included, is kept.
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
