use crate::catalog::Catalog;
use crate::domain::model::MonthlyPlaylistEntry;
use crate::domain::month::YearMonth;
use crate::narration::{NarrationRules, ScriptVariant, DEFAULT_MODEL};
use crate::utils::error::{HakoakeError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const SECTIONED_TEMPLATE: &str = include_str!("../../templates/sectioned.md");
pub const PARAGRAPH_TEMPLATE: &str = include_str!("../../templates/paragraph.md");

const SITE_FLAVOR: &str = "\
Can't see the artist from your seat? Skip the arenas and stadiums.
Your next favorite band is playing in dark, cramped basement bars: the Tokyo \"live houses\".
We spotlight lesser-known bands playing venues small enough that you can actually see them,
and we only feature artists performing at low-capacity venues.";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Ollama `/api/chat` 相容的請求內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub model: String,
    pub variant: ScriptVariant,
    /// 取代內建模板
    pub template: Option<String>,
    pub rules: NarrationRules,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            variant: ScriptVariant::default(),
            template: None,
            rules: NarrationRules::default(),
        }
    }
}

impl PromptOptions {
    fn template(&self) -> &str {
        match (&self.template, self.variant) {
            (Some(custom), _) => custom,
            (None, ScriptVariant::Sectioned) => SECTIONED_TEMPLATE,
            (None, ScriptVariant::Paragraph) => PARAGRAPH_TEMPLATE,
        }
    }
}

/// 替換 `{{name}}`，未知的保留原樣
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn template_values(
    month: &str,
    performer_count: usize,
    options: &PromptOptions,
) -> HashMap<&'static str, String> {
    let (min_seconds, max_seconds) = options.variant.duration_bounds();
    let banned = options
        .rules
        .banned_phrases
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");

    HashMap::from([
        ("month", month.to_string()),
        ("performer_count", performer_count.to_string()),
        ("banned_phrases", banned),
        ("min_words", options.rules.performer_min_words.to_string()),
        ("max_words", options.rules.performer_max_words.to_string()),
        ("duration", format!("{}-{} seconds", min_seconds, max_seconds)),
    ])
}

fn time_or_tba(time: Option<chrono::NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "TBA".to_string())
}

/// 單一項目的表演者、歌曲與當月演出資料
fn entry_lines(catalog: &Catalog, entry: &MonthlyPlaylistEntry, month: YearMonth) -> Result<Vec<String>> {
    let song = catalog.song(entry.song_id).ok_or_else(|| HakoakeError::NotFound {
        entity: "PerformerSong",
        id: entry.song_id.to_string(),
    })?;
    let performer = catalog
        .performer(song.performer_id)
        .ok_or_else(|| HakoakeError::NotFound {
            entity: "Performer",
            id: song.performer_id.to_string(),
        })?;

    let mut lines = vec![
        format!("{}. Artist: {}", entry.position, performer.name),
        format!("\t- name kana: {}", performer.name_kana),
        format!("\t- name romaji: {}", performer.name_romaji),
        format!("\t- website: {}", performer.website),
        format!("\t- email: {}", performer.email),
        format!("\t- song (youtube link title): {}", song.title),
        format!(
            "\t- youtube release date: {}",
            song.release_date.map(|d| d.to_string()).unwrap_or_default()
        ),
        format!(
            "\t- playlist appearances: {}",
            catalog.appearances_excluding(performer.id, entry.playlist_id)
        ),
    ];
    if entry.is_spotlight {
        lines.push(
            "\t- monthly spotlight artist: true (a special spotlighted artist for this month)".to_string(),
        );
    }
    lines.extend(
        performer
            .social_links
            .iter()
            .map(|link| format!("\t- {}: {}", link.platform, link.url)),
    );

    let performances = catalog.performances_of(performer.id, month);
    if !performances.is_empty() {
        lines.push(format!("\t- performances in {}:", month.long_name()));
    }
    for performance in performances {
        let house = catalog.live_house(performance.live_house_id);
        lines.push(format!(
            "\t\t- date: {}",
            performance.performance_date.format("%Y-%m-%d (%a)")
        ));
        lines.push(format!("\t\t  venue: {}", house.map(|h| h.name.as_str()).unwrap_or("")));
        lines.push(format!("\t\t  venue kana: {}", house.map(|h| h.name_kana.as_str()).unwrap_or("")));
        lines.push(format!("\t\t  venue romaji: {}", house.map(|h| h.name_romaji.as_str()).unwrap_or("")));
        lines.push(format!("\t\t  open: {}", time_or_tba(performance.open_time)));
        lines.push(format!("\t\t  start: {}", time_or_tba(Some(performance.start_time))));
    }
    Ok(lines)
}

/// 組出旁白請求：system 為模板，user 為各項目的表演者資料
pub fn build_prompt(catalog: &Catalog, playlist_id: u64, options: &PromptOptions) -> Result<ChatRequest> {
    let playlist = catalog
        .playlist(playlist_id)
        .ok_or_else(|| HakoakeError::NotFound {
            entity: "MonthlyPlaylist",
            id: playlist_id.to_string(),
        })?;
    let month = playlist.month;
    let entries = catalog.entries_of(playlist_id);
    if entries.is_empty() {
        return Err(HakoakeError::PlaylistRuleError {
            message: format!("playlist {} has no entries", playlist_id),
        });
    }

    let mut lines = vec![
        format!(
            "For the month of {} write an introduction to the selected artists below, describing where and when they will play.",
            month.month_name()
        ),
        "The site's description follows. DO NOT include it in the response, only use it for flavor:".to_string(),
        format!("{}\n", SITE_FLAVOR),
        "The text is the voice-over for a slide presentation.".to_string(),
        "Selected artists, in playlist order:".to_string(),
    ];
    for entry in &entries {
        lines.extend(entry_lines(catalog, entry, month)?);
        lines.push(String::new());
    }
    let user = lines.join("\n") + "\n";

    let system = render_template(
        options.template(),
        &template_values(&month.long_name(), entries.len(), options),
    );

    tracing::debug!(
        "📝 Built {} prompt for playlist {} ({} entries)",
        options.variant,
        playlist_id,
        entries.len()
    );

    Ok(ChatRequest {
        model: options.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user,
            },
        ],
        stream: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::*;
    use crate::playlist::{add_spotlight, commit_rotation, plan_rotation};

    #[test]
    fn test_render_template_keeps_unknown_placeholders() {
        let values = HashMap::from([("month", "November 2025".to_string())]);
        assert_eq!(
            render_template("{{month}} / {{ month }} / {{unknown}}", &values),
            "November 2025 / November 2025 / {{unknown}}"
        );
    }

    #[test]
    fn test_builtin_templates_have_no_leftover_placeholders() {
        for variant in [ScriptVariant::Sectioned, ScriptVariant::Paragraph] {
            let options = PromptOptions {
                variant,
                ..Default::default()
            };
            let rendered = render_template(options.template(), &template_values("November 2025", 5, &options));
            assert!(!rendered.contains("{{"), "{} left placeholders", variant);
            assert!(rendered.contains("\"hidden gem\""));
        }
    }

    #[test]
    fn test_build_prompt() {
        let mut catalog = Catalog::new();
        let mut shelter = venue("下北沢SHELTER", "https://shelter.example.jp");
        shelter.name_romaji = "Shimokitazawa Shelter".to_string();
        let mut lead = performer("羊文学", "Hitsujibungaku", vec![song("more than words", "v1", Some(50), Some(240))]);
        lead.name_kana = "ひつじぶんがく".to_string();
        add_schedule(
            &mut catalog,
            &schedule(
                shelter,
                "2025-11-03",
                vec![lead, performer("Beta", "", vec![song("B", "v2", Some(10), Some(200))])],
            ),
        );

        let month = YearMonth::parse("2025-11").unwrap();
        let plan = plan_rotation(&catalog, month, 1).unwrap();
        let id = commit_rotation(&mut catalog, &plan, None, "", now()).unwrap();
        // Beta 依名稱排序先入選，羊文学 作為 spotlight
        let lead = catalog.performer_by_name("羊文学").unwrap().id;
        add_spotlight(&mut catalog, id, lead, 7).unwrap();

        let request = build_prompt(&catalog, id, &PromptOptions::default()).unwrap();
        assert_eq!(request.model, DEFAULT_MODEL);
        assert!(!request.stream);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[0].content.contains("Write exactly 2 performer sections"));

        let user = &request.messages[1].content;
        assert!(user.contains("1. Artist: Beta"));
        assert!(user.contains("2. Artist: 羊文学\n\t- name kana: ひつじぶんがく\n\t- name romaji: Hitsujibungaku"));
        assert!(user.contains("\t\t- date: 2025-11-03 (Mon)"));
        assert!(user.contains("\t\t  venue romaji: Shimokitazawa Shelter"));
        assert!(user.contains("\t\t  open: 18:30\n\t\t  start: 19:00"));
        assert!(user.contains("monthly spotlight artist: true"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_custom_template_and_missing_playlist() {
        let options = PromptOptions {
            template: Some("Lineup for {{month}}: {{tone}}".to_string()),
            ..Default::default()
        };
        let values = template_values("November 2025", 1, &options);
        assert_eq!(render_template(options.template(), &values), "Lineup for November 2025: {{tone}}");

        assert!(matches!(
            build_prompt(&Catalog::new(), 1, &options),
            Err(HakoakeError::NotFound { .. })
        ));
    }
}
