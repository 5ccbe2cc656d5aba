use crate::narration::script::{
    is_header, parse_sections, preamble, word_count, words_lowercase, Section, SectionKind,
};
use crate::narration::{NarrationRules, ScriptVariant};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::LazyLock;

pub const PARAGRAPH_MIN_WORDS: usize = 150;
pub const PARAGRAPH_MAX_WORDS: usize = 225;

/// 平假名、片假名、CJK 漢字與全形字元
static NON_ROMAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{3000}-\u{30FF}\u{3400}-\u{4DBF}\u{4E00}-\u{9FFF}\u{F900}-\u{FAFF}\u{FF00}-\u{FFEF}]+")
        .unwrap()
});

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    BannedPhrase { phrase: String, location: String },
    SectionLength { index: u32, words: usize, min: usize, max: usize },
    ParagraphLength { words: usize, min: usize, max: usize },
    Duration { seconds: f64, min: u32, max: u32 },
    NonRomanText { location: String, excerpt: String },
    RepeatedPhrase { phrase: String, sections: Vec<u32> },
    Structure { message: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BannedPhrase { phrase, location } => {
                write!(f, "banned phrase \"{}\" in {}", phrase, location)
            }
            Self::SectionLength { index, words, min, max } => write!(
                f,
                "PERFORMER {} has {} words (expected {}-{})",
                index, words, min, max
            ),
            Self::ParagraphLength { words, min, max } => {
                write!(f, "paragraph has {} words (expected {}-{})", words, min, max)
            }
            Self::Duration { seconds, min, max } => write!(
                f,
                "estimated duration {:.1}s is outside {}-{}s",
                seconds, min, max
            ),
            Self::NonRomanText { location, excerpt } => {
                write!(f, "non-Roman text \"{}\" in {}", excerpt, location)
            }
            Self::RepeatedPhrase { phrase, sections } => {
                let sections: Vec<String> = sections.iter().map(|s| s.to_string()).collect();
                write!(
                    f,
                    "phrase \"{}\" repeated in performer sections {}",
                    phrase,
                    sections.join(", ")
                )
            }
            Self::Structure { message } => write!(f, "structure: {}", message),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub violations: Vec<Violation>,
    pub word_count: usize,
    pub estimated_seconds: f64,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn describe(&self) -> String {
        let mut lines = vec![format!(
            "{} words, ~{:.0}s spoken",
            self.word_count, self.estimated_seconds
        )];
        if self.is_clean() {
            lines.push("✅ No violations".to_string());
        }
        for violation in &self.violations {
            lines.push(format!("  - {}", violation));
        }
        lines.join("\n")
    }
}

/// 要檢查的文字片段與其位置標籤
struct Passage {
    location: String,
    text: String,
}

/// 彎引號 ’ ‘ 換成 '
fn straight_quotes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}

fn banned_phrase_violations(passages: &[Passage], rules: &NarrationRules) -> Vec<Violation> {
    let mut violations = Vec::new();
    for phrase in rules.banned_phrases.iter().filter(|p| !p.trim().is_empty()) {
        let phrase = straight_quotes(phrase.trim());
        let pattern = format!(r"\b{}\b", regex::escape(&phrase));
        let Ok(matcher) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            tracing::warn!("⚠️ Skipping banned phrase that does not compile: {}", phrase);
            continue;
        };
        for passage in passages {
            if matcher.is_match(&straight_quotes(&passage.text)) {
                violations.push(Violation::BannedPhrase {
                    phrase: phrase.clone(),
                    location: passage.location.clone(),
                });
            }
        }
    }
    violations
}

fn non_roman_violations(passages: &[Passage]) -> Vec<Violation> {
    passages
        .iter()
        .flat_map(|passage| {
            NON_ROMAN.find_iter(&passage.text).map(|m| Violation::NonRomanText {
                location: passage.location.clone(),
                excerpt: m.as_str().to_string(),
            })
        })
        .collect()
}

/// 同一個 n-gram 出現在兩個以上表演者段落
fn repeated_phrase_violations(sections: &[Section], n: usize) -> Vec<Violation> {
    if n == 0 {
        return Vec::new();
    }

    let mut seen: HashMap<String, BTreeSet<u32>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for section in sections {
        let SectionKind::Performer { number, .. } = section.kind else {
            continue;
        };
        let words = words_lowercase(&section.text);
        for gram in words.windows(n) {
            let phrase = gram.join(" ");
            let entry = seen.entry(phrase.clone()).or_default();
            if entry.is_empty() {
                order.push(phrase);
            }
            entry.insert(number);
        }
    }

    order
        .into_iter()
        .filter_map(|phrase| {
            let numbers = seen.remove(&phrase)?;
            (numbers.len() > 1).then(|| Violation::RepeatedPhrase {
                phrase,
                sections: numbers.into_iter().collect(),
            })
        })
        .collect()
}

fn structure_violations(sections: &[Section], expected_performers: Option<usize>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let structure = |message: String| Violation::Structure { message };

    if sections.is_empty() {
        violations.push(structure("no `# INTRO` / `# PERFORMER n:` / `# CLOSING` sections found".to_string()));
        return violations;
    }
    if sections.first().map(|s| &s.kind) != Some(&SectionKind::Intro) {
        violations.push(structure("script must start with `# INTRO`".to_string()));
    }
    if sections.last().map(|s| &s.kind) != Some(&SectionKind::Closing) {
        violations.push(structure("script must end with `# CLOSING`".to_string()));
    }

    let middle = if sections.len() > 2 {
        &sections[1..sections.len() - 1]
    } else {
        &[][..]
    };
    if middle
        .iter()
        .any(|s| !matches!(s.kind, SectionKind::Performer { .. }))
    {
        violations.push(structure(
            "only PERFORMER sections may appear between INTRO and CLOSING".to_string(),
        ));
    }

    let numbers: Vec<u32> = sections
        .iter()
        .filter_map(|s| match s.kind {
            SectionKind::Performer { number, .. } => Some(number),
            _ => None,
        })
        .collect();
    let in_order = numbers
        .iter()
        .enumerate()
        .all(|(i, &number)| number as usize == i + 1);
    if !in_order {
        violations.push(structure(format!(
            "performer sections must be numbered 1..{} in order, found {:?}",
            numbers.len(),
            numbers
        )));
    }
    if let Some(expected) = expected_performers {
        if numbers.len() != expected {
            violations.push(structure(format!(
                "expected {} performer sections, found {}",
                expected,
                numbers.len()
            )));
        }
    }

    violations
}

/// 檢查模型產生的旁白稿
pub fn lint(
    script: &str,
    variant: ScriptVariant,
    expected_performers: Option<usize>,
    rules: &NarrationRules,
) -> LintReport {
    let mut violations = Vec::new();

    let (passages, words) = match variant {
        ScriptVariant::Sectioned => {
            let sections = parse_sections(script);
            violations.extend(structure_violations(&sections, expected_performers));

            for section in &sections {
                if let SectionKind::Performer { number, .. } = section.kind {
                    let words = section.word_count();
                    if words < rules.performer_min_words || words > rules.performer_max_words {
                        violations.push(Violation::SectionLength {
                            index: number,
                            words,
                            min: rules.performer_min_words,
                            max: rules.performer_max_words,
                        });
                    }
                }
            }
            violations.extend(repeated_phrase_violations(&sections, rules.repeated_ngram));

            let mut passages = Vec::new();
            if sections.is_empty() {
                passages.push(Passage {
                    location: "script".to_string(),
                    text: script.to_string(),
                });
            }

            let leading = preamble(script);
            if !leading.is_empty() {
                violations.push(Violation::Structure {
                    message: "text before the first section header is not allowed".to_string(),
                });
                passages.push(Passage {
                    location: "preamble".to_string(),
                    text: leading,
                });
            }

            for section in &sections {
                // 標題裡的藝人名稱也要檢查
                if let SectionKind::Performer { name, .. } = &section.kind {
                    if !name.is_empty() {
                        passages.push(Passage {
                            location: format!("{} header", section.label()),
                            text: name.clone(),
                        });
                    }
                }
                passages.push(Passage {
                    location: section.label(),
                    text: section.text.clone(),
                });
            }
            (passages, sections.iter().map(Section::word_count).sum())
        }
        ScriptVariant::Paragraph => {
            let text = script.trim();
            if text.lines().any(is_header) {
                violations.push(Violation::Structure {
                    message: "paragraph script must not contain section headers".to_string(),
                });
            }
            if BLANK_LINE.is_match(text) {
                violations.push(Violation::Structure {
                    message: "paragraph script must be a single paragraph".to_string(),
                });
            }

            let words = word_count(text);
            if !(PARAGRAPH_MIN_WORDS..=PARAGRAPH_MAX_WORDS).contains(&words) {
                violations.push(Violation::ParagraphLength {
                    words,
                    min: PARAGRAPH_MIN_WORDS,
                    max: PARAGRAPH_MAX_WORDS,
                });
            }

            let passages = vec![Passage {
                location: "paragraph".to_string(),
                text: text.to_string(),
            }];
            (passages, words)
        }
    };

    violations.extend(banned_phrase_violations(&passages, rules));
    violations.extend(non_roman_violations(&passages));

    let estimated_seconds = rules.estimated_seconds(words);
    let (min, max) = variant.duration_bounds();
    if estimated_seconds < min as f64 || estimated_seconds > max as f64 {
        violations.push(Violation::Duration {
            seconds: estimated_seconds,
            min,
            max,
        });
    }

    if !violations.is_empty() {
        tracing::debug!("🔍 Script has {} violations", violations.len());
    }

    LintReport {
        violations,
        word_count: words,
        estimated_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 產生不重複的單字，避免誤判重複片語
    fn filler(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|i| format!("{}{}", prefix, i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn sectioned(first: &str, second: &str) -> String {
        format!(
            "# INTRO\n{}\n\n# PERFORMER 1: Alpha\n{}\n\n# PERFORMER 2: Beta\n{}\n\n# CLOSING\n{}\n",
            filler("intro", 60),
            first,
            second,
            filler("bye", 40)
        )
    }

    fn clean_script() -> String {
        sectioned(&filler("first", 30), &filler("second", 30))
    }

    #[test]
    fn test_clean_sectioned_script() {
        let report = lint(&clean_script(), ScriptVariant::Sectioned, Some(2), &NarrationRules::default());
        assert!(report.is_clean(), "{}", report.describe());
        assert_eq!(report.word_count, 160);
        assert_eq!(report.estimated_seconds, 64.0);
    }

    #[test]
    fn test_banned_phrase_on_word_boundaries() {
        let first = format!("{} a Hidden Gem", filler("first", 27));
        let second = format!("{} hidden gems", filler("second", 28));
        let report = lint(&sectioned(&first, &second), ScriptVariant::Sectioned, None, &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![Violation::BannedPhrase {
                phrase: "hidden gem".to_string(),
                location: "PERFORMER 1".to_string(),
            }]
        );
    }

    #[test]
    fn test_section_length_and_non_roman() {
        let first = format!("{} 羊文学 play", filler("first", 5));
        let report = lint(&sectioned(&first, &filler("second", 30)), ScriptVariant::Sectioned, None, &NarrationRules::default());
        assert!(report.violations.contains(&Violation::SectionLength {
            index: 1,
            words: 7,
            min: 25,
            max: 40,
        }));
        assert!(report.violations.contains(&Violation::NonRomanText {
            location: "PERFORMER 1".to_string(),
            excerpt: "羊文学".to_string(),
        }));
    }

    #[test]
    fn test_repeated_phrase_across_performers() {
        let first = format!("{} they play at Shelter tonight", filler("first", 25));
        let second = format!("{} and they play at shelter soon", filler("second", 24));
        let report = lint(&sectioned(&first, &second), ScriptVariant::Sectioned, None, &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![Violation::RepeatedPhrase {
                phrase: "they play at shelter".to_string(),
                sections: vec![1, 2],
            }]
        );
    }

    #[test]
    fn test_structure_violations() {
        let script = format!(
            "# INTRO\n{}\n# PERFORMER 2: Beta\n{}\n",
            filler("intro", 100),
            filler("second", 30)
        );
        let report = lint(&script, ScriptVariant::Sectioned, Some(3), &NarrationRules::default());
        let messages: Vec<String> = report
            .violations
            .iter()
            .filter(|v| matches!(v, Violation::Structure { .. }))
            .map(|v| v.to_string())
            .collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("must end with `# CLOSING`"));
        assert!(messages[1].contains("numbered 1..1 in order"));
        assert!(messages[2].contains("expected 3 performer sections, found 1"));

        let report = lint("no headers at all", ScriptVariant::Sectioned, None, &NarrationRules::default());
        assert!(report.violations[0].to_string().contains("no `# INTRO`"));
    }

    #[test]
    fn test_paragraph_variant() {
        let rules = NarrationRules::default();
        assert!(lint(&filler("word", 160), ScriptVariant::Paragraph, None, &rules).is_clean());

        let split = format!("{}\n\n{}", filler("one", 80), filler("two", 80));
        let report = lint(&split, ScriptVariant::Paragraph, None, &rules);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].to_string().contains("single paragraph"));

        let report = lint(&filler("word", 100), ScriptVariant::Paragraph, None, &rules);
        assert!(report.violations.contains(&Violation::ParagraphLength {
            words: 100,
            min: 150,
            max: 225,
        }));
        assert!(report.violations.contains(&Violation::Duration {
            seconds: 40.0,
            min: 60,
            max: 90,
        }));
    }

    #[test]
    fn test_non_roman_artist_name_in_header() {
        let script = clean_script().replace("# PERFORMER 1: Alpha", "# PERFORMER 1: 羊文学");
        let report = lint(&script, ScriptVariant::Sectioned, Some(2), &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![Violation::NonRomanText {
                location: "PERFORMER 1 header".to_string(),
                excerpt: "羊文学".to_string(),
            }]
        );
    }

    #[test]
    fn test_banned_phrase_with_typographic_apostrophe() {
        let first = format!("{} don\u{2019}t miss", filler("first", 28));
        let report = lint(&sectioned(&first, &filler("second", 30)), ScriptVariant::Sectioned, None, &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![Violation::BannedPhrase {
                phrase: "don't miss".to_string(),
                location: "PERFORMER 1".to_string(),
            }]
        );

        let rules = NarrationRules {
            banned_phrases: vec!["you\u{2019}ll love".to_string()],
            ..NarrationRules::default()
        };
        let second = format!("{} you'll love", filler("second", 27));
        let report = lint(&sectioned(&filler("first", 30), &second), ScriptVariant::Sectioned, None, &rules);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].to_string().contains("PERFORMER 2"));
    }

    #[test]
    fn test_banned_phrase_in_paragraph() {
        let text = format!("{} truly vibrant", filler("word", 160));
        let report = lint(&text, ScriptVariant::Paragraph, None, &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![Violation::BannedPhrase {
                phrase: "vibrant".to_string(),
                location: "paragraph".to_string(),
            }]
        );
    }

    #[test]
    fn test_sectioned_script_too_long() {
        let script = format!(
            "# INTRO\n{}\n\n# PERFORMER 1: Alpha\n{}\n\n# PERFORMER 2: Beta\n{}\n\n# CLOSING\n{}\n",
            filler("intro", 250),
            filler("first", 30),
            filler("second", 30),
            filler("bye", 40)
        );
        let report = lint(&script, ScriptVariant::Sectioned, Some(2), &NarrationRules::default());
        assert_eq!(report.word_count, 350);
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            Violation::Duration { seconds, min: 60, max: 120 } if seconds > 120.0
        ));
    }

    #[test]
    fn test_text_before_intro_is_flagged() {
        let script = format!("Sure! Here is your vibrant script.\n\n{}", clean_script());
        let report = lint(&script, ScriptVariant::Sectioned, Some(2), &NarrationRules::default());
        assert_eq!(
            report.violations,
            vec![
                Violation::Structure {
                    message: "text before the first section header is not allowed".to_string(),
                },
                Violation::BannedPhrase {
                    phrase: "vibrant".to_string(),
                    location: "preamble".to_string(),
                },
            ]
        );
        // 前言不計入字數
        assert_eq!(report.word_count, 160);
    }
}
