use crate::domain::draft::PerformerDraft;
use crate::domain::model::SocialLink;
use regex::Regex;
use std::sync::LazyLock;

static SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,、\n]").unwrap());

static PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[¥￥]\s*\d+[,\d]*").unwrap());
static TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").unwrap());
static DRINK_NOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*1D.*\)").unwrap());
static DRINK_PLUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+1D").unwrap());
static DRINK_JP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"入場時別途1D").unwrap());
static WEEKDAY_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(][月火水木金土日][）)]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const EDGE_CHARS: &[char] = &['-', ' ', '/', '\\', '(', ')', '[', ']', '{', '}', '、', '。'];

static NOT_A_NAME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[¥￥]\d+",
        r"^\d{1,2}:\d{2}",
        r"(?i)^(ABOUT|HOME|SCHEDULE|ACCESS|NEWS|CONTACT|TICKET|STAFF|ACT|LIVE)$",
        r"^\d{4}[-/年]\d{1,2}[-/月]\d{1,2}[日]?$",
        r"^(月|火|水|木|金|土|日)$",
        r"^\d+$",
        r"^[-/\\()（）]+$",
        r"^,\d+$",
        r"(?i)FOOD[:：]",
        r"入場時別途",
        r"(?i)start|open|door",
        r"^(予約|料金|時間|開場|開演)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static MEANINGFUL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]").unwrap());

static NOT_AN_ARTIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(dj|host|mc|司会|ホスト|ナビゲーター|進行)\b",
        r"(?i)\b(schedule|スケジュール|calendar|カレンダー)\b",
        r"(?i)\b(staff|スタッフ|管理|admin)\b",
        r"(?i)\b(guest|ゲスト|客|お客)\b",
        r"(?i)\b(sound|音響|lighting|照明|tech|技術)\b",
        r"(?i)\b(food|フード|drink|ドリンク|bar|バー)\b",
        r"(?i)\b(ticket|チケット|reservation|予約)\b",
        r"(?i)\b(open|close|開|閉|start|終)\b",
        r"(?i)\b(doors|ドア|entrance|入場|exit|退場)\b",
        r"^\d+:\d+",
        r"^\d+[年月日]",
        r"^[¥$]\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static READING_NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^（]+)（([^）]+)）").unwrap());
static KANA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}]").unwrap());
static KATAKANA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x{30A0}-\x{30FF}]").unwrap());
static JAPANESE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]").unwrap());

pub const SOCIAL_PLATFORMS: &[&str] = &[
    "twitter",
    "instagram",
    "facebook",
    "youtube",
    "bandcamp",
    "soundcloud",
    "spotify",
    "apple_music",
    "tiktok",
    "discord",
    "twitch",
    "reddit",
    "linkedin",
    "vimeo",
    "github",
    "patreon",
    "mastodon",
];

const GENERIC_SITES: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "venue.com",
    "livehouse.com",
    "event.com",
    "google.com",
    "yahoo.com",
    "example.com",
    "localhost",
    "127.0.0.1",
];

/// 以 `,`、`、` 與換行切開表演者字串；`/` 保留給名稱標記
pub fn split_performers(text: &str) -> Vec<String> {
    SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 去掉票價、時間、飲料費、星期等非名稱片段
pub fn clean_performer_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return String::new();
    }

    let name = PRICE.replace_all(name, "");
    let name = TIME.replace_all(&name, "");
    let name = DRINK_NOTE.replace_all(&name, "");
    let name = DRINK_PLUS.replace_all(&name, "");
    let name = DRINK_JP.replace_all(&name, "");
    let name = WEEKDAY_MARK.replace_all(&name, "");
    let name = WHITESPACE.replace_all(&name, " ");

    name.trim_matches(EDGE_CHARS).trim().to_string()
}

pub fn is_valid_performer_name(name: &str) -> bool {
    if name.chars().count() < 2 {
        return false;
    }
    if NOT_A_NAME.iter().any(|re| re.is_match(name)) {
        return false;
    }
    MEANINGFUL.is_match(name)
}

/// 排除 DJ、主持、工作人員、時間等明顯不是樂團的名稱
pub fn is_valid_artist_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if NOT_AN_ARTIST.iter().any(|re| re.is_match(&lower)) {
        return false;
    }

    trimmed.chars().count() >= 2 && !trimmed.chars().all(|c| c.is_ascii_digit())
}

/// 解析 `名前（よみ）`、`日本語/English` 與含 `・` 的片假名名稱
pub fn apply_name_notation(draft: &mut PerformerDraft) {
    let name = draft.name.clone();

    if name.contains('（') && name.contains('）') {
        if let Some(caps) = READING_NOTATION.captures(&name) {
            let main_name = caps[1].trim().to_string();
            let reading = caps[2].trim().to_string();
            draft.name = main_name;
            if KANA.is_match(&reading) {
                draft.name_kana = reading;
            } else {
                draft.name_romaji = reading;
            }
        }
    } else if name.contains('/') && name.split('/').count() == 2 {
        let parts: Vec<&str> = name.split('/').map(str::trim).collect();
        let (first, second) = (parts[0], parts[1]);
        let first_jp = JAPANESE.is_match(first);
        let second_jp = JAPANESE.is_match(second);

        if first_jp && !second_jp {
            draft.name = first.to_string();
            draft.name_romaji = second.to_string();
        } else if second_jp && !first_jp {
            draft.name = second.to_string();
            draft.name_romaji = first.to_string();
        }
    } else if name.contains('・') && KATAKANA.is_match(&name) {
        draft.name_kana = name;
    }

    if draft.name_romaji.is_empty() && draft.name.is_ascii() {
        draft.name_romaji = draft.name.clone();
    }
}

/// 新表演者需要已知平台的社群連結，或一個非通用網站
pub fn has_online_presence(draft: &PerformerDraft) -> bool {
    let has_social = draft.social_links.iter().any(|link| {
        SOCIAL_PLATFORMS.contains(&link.platform.to_lowercase().as_str()) && !link.url.is_empty()
    });
    if has_social {
        return true;
    }

    let website = draft.website.trim().to_lowercase();
    if website.is_empty() {
        return false;
    }
    let is_generic = GENERIC_SITES.iter().any(|generic| website.contains(generic));
    !is_generic && website.len() > 10
}

pub fn extract_platform_id(url: &str, platform: &str) -> Option<String> {
    let pattern = match platform {
        "twitter" => r"(?:twitter\.com|x\.com)/([^/?\s]+)".to_string(),
        "instagram" => r"instagram\.com/([^/?\s]+)".to_string(),
        "youtube" => r"youtube\.com/(?:c/|channel/|user/)?([^/?\s]+)".to_string(),
        "facebook" => r"facebook\.com/([^/?\s]+)".to_string(),
        "tiktok" => r"tiktok\.com/@?([^/?\s]+)".to_string(),
        "discord" => r"discord\.(?:gg|com)/([^/?\s]+)".to_string(),
        "twitch" => r"twitch\.tv/([^/?\s]+)".to_string(),
        "reddit" => r"reddit\.com/(?:r/|u/|user/)?([^/?\s]+)".to_string(),
        "mastodon" => r"mastodon\.(?:social|online)/(@?[^/?\s]+)".to_string(),
        "bandcamp" | "soundcloud" | "spotify" | "linkedin" | "vimeo" | "github" | "patreon" => {
            format!(r"{}\.com/([^/?\s]+)", platform)
        }
        _ => return None,
    };

    let re = Regex::new(&pattern).ok()?;
    re.captures(url).map(|caps| caps[1].to_string())
}

/// 補上缺少的 platform_id 並統一小寫平台名稱
pub fn normalize_social_link(platform: &str, url: &str, platform_id: Option<&str>) -> SocialLink {
    let platform = platform.trim().to_lowercase();
    let url = url.trim().to_string();
    let platform_id = platform_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| extract_platform_id(&url, &platform))
        .unwrap_or_default();

    SocialLink {
        platform,
        platform_id,
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> PerformerDraft {
        PerformerDraft {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_performers_keeps_slash_notation() {
        assert_eq!(
            split_performers("Alpha, ベータ、Gamma\n羊文学/Hitsujibungaku"),
            vec!["Alpha", "ベータ", "Gamma", "羊文学/Hitsujibungaku"]
        );
        assert!(split_performers(" , 、\n").is_empty());
    }

    #[test]
    fn test_clean_performer_name() {
        assert_eq!(clean_performer_name("ズーカラデル ¥3,000"), "ズーカラデル");
        assert_eq!(clean_performer_name("19:00 the band apart"), "the band apart");
        assert_eq!(clean_performer_name("Alpha (+1D ¥600)"), "Alpha");
        assert_eq!(clean_performer_name("Beta +1D"), "Beta");
        assert_eq!(clean_performer_name("Gamma（土）"), "Gamma");
        assert_eq!(clean_performer_name("- Delta   Echo /"), "Delta Echo");
        assert_eq!(clean_performer_name("   "), "");
    }

    #[test]
    fn test_is_valid_performer_name() {
        assert!(is_valid_performer_name("羊文学"));
        assert!(is_valid_performer_name("the band apart"));
        assert!(!is_valid_performer_name("A"));
        assert!(!is_valid_performer_name("2025/11/03"));
        assert!(!is_valid_performer_name("12345"));
        assert!(!is_valid_performer_name("SCHEDULE"));
        assert!(!is_valid_performer_name("FOOD: curry"));
        assert!(!is_valid_performer_name("Door ticket"));
        assert!(!is_valid_performer_name("開演"));
        assert!(!is_valid_performer_name("!!"));
    }

    #[test]
    fn test_is_valid_artist_name() {
        assert!(is_valid_artist_name("Kinoko Teikoku"));
        assert!(!is_valid_artist_name("DJ Nobu"));
        assert!(!is_valid_artist_name("Guest Vocal"));
        assert!(!is_valid_artist_name("bar time"));
        assert!(!is_valid_artist_name("2025年"));
        assert!(!is_valid_artist_name("$20 entry"));
        assert!(!is_valid_artist_name("42"));
    }

    #[test]
    fn test_reading_notation() {
        let mut kana = draft("羊文学（ひつじぶんがく）");
        apply_name_notation(&mut kana);
        assert_eq!(kana.name, "羊文学");
        assert_eq!(kana.name_kana, "ひつじぶんがく");

        let mut romaji = draft("羊文学（Hitsujibungaku）");
        apply_name_notation(&mut romaji);
        assert_eq!(romaji.name, "羊文学");
        assert_eq!(romaji.name_romaji, "Hitsujibungaku");
    }

    #[test]
    fn test_slash_and_dot_notation() {
        let mut jp_first = draft("羊文学/Hitsujibungaku");
        apply_name_notation(&mut jp_first);
        assert_eq!(jp_first.name, "羊文学");
        assert_eq!(jp_first.name_romaji, "Hitsujibungaku");

        let mut en_first = draft("Hitsujibungaku / 羊文学");
        apply_name_notation(&mut en_first);
        assert_eq!(en_first.name, "羊文学");
        assert_eq!(en_first.name_romaji, "Hitsujibungaku");

        let mut dotted = draft("ニガミ・トリオ");
        apply_name_notation(&mut dotted);
        assert_eq!(dotted.name_kana, "ニガミ・トリオ");
        assert!(dotted.name_romaji.is_empty());

        let mut ascii = draft("the pillows");
        apply_name_notation(&mut ascii);
        assert_eq!(ascii.name_romaji, "the pillows");
    }

    #[test]
    fn test_online_presence() {
        let mut performer = draft("Alpha");
        assert!(!has_online_presence(&performer));

        performer.website = "https://example.com/alpha".to_string();
        assert!(!has_online_presence(&performer));

        performer.website = "https://alpha-band.jp".to_string();
        assert!(has_online_presence(&performer));

        let mut social = draft("Beta");
        social.social_links = vec![normalize_social_link("Instagram", "https://instagram.com/beta_band", None)];
        assert!(has_online_presence(&social));
        assert_eq!(social.social_links[0].platform_id, "beta_band");
    }

    #[test]
    fn test_extract_platform_id() {
        assert_eq!(
            extract_platform_id("https://x.com/hitsujibungaku", "twitter").as_deref(),
            Some("hitsujibungaku")
        );
        assert_eq!(
            extract_platform_id("https://www.youtube.com/channel/UC123", "youtube").as_deref(),
            Some("UC123")
        );
        assert_eq!(
            extract_platform_id("https://soundcloud.com/alpha-band", "soundcloud").as_deref(),
            Some("alpha-band")
        );
        assert_eq!(extract_platform_id("https://alpha-band.jp", "twitter"), None);
        assert_eq!(extract_platform_id("https://myspace.com/x", "myspace"), None);
    }
}
