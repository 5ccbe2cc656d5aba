// 播放清單影片旁白：組 prompt、解析與檢查模型產生的稿子

pub mod lint;
pub mod prompt;
pub mod script;

use crate::utils::error::HakoakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use lint::{lint, LintReport, Violation};
pub use prompt::{build_prompt, render_template, ChatMessage, ChatRequest, PromptOptions};
pub use script::{parse_sections, Section, SectionKind};

pub const DEFAULT_MODEL: &str = "gemma3:12b";

pub const DEFAULT_BANNED_PHRASES: &[&str] = &[
    "vibrant",
    "hidden gem",
    "tapestry",
    "electrifying",
    "unforgettable",
    "delve",
    "testament to",
    "melodic journey",
    "sonic landscape",
    "don't miss",
    "must-see",
    "whether you're",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptVariant {
    /// `# INTRO` / `# PERFORMER n: Name` / `# CLOSING`
    #[default]
    Sectioned,
    /// 150-225 字的單一段落
    Paragraph,
}

impl ScriptVariant {
    /// 朗讀秒數的上下限
    pub fn duration_bounds(&self) -> (u32, u32) {
        match self {
            Self::Sectioned => (60, 120),
            Self::Paragraph => (60, 90),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sectioned => "sectioned",
            Self::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for ScriptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptVariant {
    type Err = HakoakeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sectioned" | "a" => Ok(Self::Sectioned),
            "paragraph" | "b" => Ok(Self::Paragraph),
            other => Err(HakoakeError::ValidationError {
                message: format!("unknown script variant '{}' (use sectioned or paragraph)", other),
            }),
        }
    }
}

/// 稿子檢查規則，也用來填 prompt 模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationRules {
    pub banned_phrases: Vec<String>,
    pub words_per_minute: u32,
    pub performer_min_words: usize,
    pub performer_max_words: usize,
    pub repeated_ngram: usize,
}

impl Default for NarrationRules {
    fn default() -> Self {
        Self {
            banned_phrases: DEFAULT_BANNED_PHRASES.iter().map(|p| p.to_string()).collect(),
            words_per_minute: 150,
            performer_min_words: 25,
            performer_max_words: 40,
            repeated_ngram: 4,
        }
    }
}

impl NarrationRules {
    pub fn estimated_seconds(&self, words: usize) -> f64 {
        words as f64 / self.words_per_minute.max(1) as f64 * 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("Paragraph".parse::<ScriptVariant>().unwrap(), ScriptVariant::Paragraph);
        assert_eq!("a".parse::<ScriptVariant>().unwrap(), ScriptVariant::Sectioned);
        assert!("haiku".parse::<ScriptVariant>().is_err());
        assert_eq!(ScriptVariant::Paragraph.duration_bounds(), (60, 90));
    }

    #[test]
    fn test_reading_pace() {
        let rules = NarrationRules::default();
        assert_eq!(rules.estimated_seconds(300), 120.0);
    }
}
