use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#\s*(?:(INTRO)|(CLOSING)|PERFORMER\s+(\d+)\s*:\s*(.*?))\s*$").unwrap()
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w']+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Performer { number: u32, name: String },
    Closing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
}

impl Section {
    /// 用於違規訊息的位置標籤
    pub fn label(&self) -> String {
        match &self.kind {
            SectionKind::Intro => "INTRO".to_string(),
            SectionKind::Performer { number, .. } => format!("PERFORMER {}", number),
            SectionKind::Closing => "CLOSING".to_string(),
        }
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

pub fn is_header(line: &str) -> bool {
    HEADER.is_match(line)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 小寫、去掉標點後的單字
pub fn words_lowercase(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn parse_header(line: &str) -> Option<SectionKind> {
    let caps = HEADER.captures(line)?;
    if caps.get(1).is_some() {
        return Some(SectionKind::Intro);
    }
    if caps.get(2).is_some() {
        return Some(SectionKind::Closing);
    }
    let number = caps.get(3)?.as_str().parse().ok()?;
    let name = caps.get(4).map(|m| m.as_str().trim()).unwrap_or("");
    Some(SectionKind::Performer {
        number,
        name: name.to_string(),
    })
}

/// 第一個標題之前的文字；沒有標題時為空字串
pub fn preamble(text: &str) -> String {
    if !text.lines().any(is_header) {
        return String::new();
    }
    text.lines()
        .take_while(|line| !is_header(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// 依標題行切段，第一個標題前的文字忽略，空段落略過
pub fn parse_sections(text: &str) -> Vec<Section> {
    fn flush(current: Option<(SectionKind, Vec<&str>)>, sections: &mut Vec<Section>) {
        if let Some((kind, lines)) = current {
            let text = lines.join("\n").trim().to_string();
            if !text.is_empty() {
                sections.push(Section { kind, text });
            }
        }
    }

    let mut sections = Vec::new();
    let mut current: Option<(SectionKind, Vec<&str>)> = None;

    for line in text.lines() {
        match parse_header(line) {
            Some(kind) => {
                flush(current.take(), &mut sections);
                current = Some((kind, Vec::new()));
            }
            None => {
                if let Some((_, lines)) = current.as_mut() {
                    lines.push(line);
                }
            }
        }
    }
    flush(current, &mut sections);

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let text = "Sure! Here is your script.\n\
                    # INTRO\nWelcome to November.\n\n\
                    #  performer 1:  Hitsujibungaku \nFirst words.\nMore words.\n\
                    # PERFORMER 2: Empty\n   \n\
                    # Closing\nSee you there.\n";

        let sections = parse_sections(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].kind, SectionKind::Intro);
        assert_eq!(sections[0].text, "Welcome to November.");
        assert_eq!(
            sections[1].kind,
            SectionKind::Performer {
                number: 1,
                name: "Hitsujibungaku".to_string()
            }
        );
        assert_eq!(sections[1].text, "First words.\nMore words.");
        assert_eq!(sections[1].word_count(), 4);
        assert_eq!(sections[2].label(), "CLOSING");
    }

    #[test]
    fn test_preamble_before_first_header() {
        assert_eq!(preamble("Sure! Here it is.\n\n# INTRO\nHello."), "Sure! Here it is.");
        assert_eq!(preamble("# INTRO\nHello."), "");
        assert_eq!(preamble("no headers"), "");
    }

    #[test]
    fn test_no_headers() {
        assert!(parse_sections("just prose").is_empty());
        assert!(!is_header("## Not a header"));
        assert!(!is_header("#INTROduction"));
    }

    #[test]
    fn test_words_lowercase_strips_punctuation() {
        assert_eq!(words_lowercase("Don't MISS it, ok?"), vec!["don't", "miss", "it", "ok"]);
    }
}
