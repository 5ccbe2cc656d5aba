// 排程匯入：把來源記錄整理成可寫入目錄的草稿

pub mod feed;
pub mod names;
pub mod ticket;

use crate::domain::draft::{PerformerDraft, ScheduleDraft, SongDraft, VenueDraft};
use crate::domain::model::Record;
use crate::utils::error::{HakoakeError, Result};
use chrono::{NaiveDate, NaiveTime};
use feed::{FeedPerformer, FeedPerformerDetail, FeedPerformers, FeedRecord, FeedSong, FeedVenue};

pub const DEFAULT_START_TIME: (u32, u32) = (19, 0);

fn rejected(stage: &str, details: impl Into<String>) -> HakoakeError {
    HakoakeError::TransformationError {
        stage: stage.to_string(),
        details: details.into(),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// 接受 `HH:MM` 與 `HH:MM:SS`
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn default_start_time() -> NaiveTime {
    let (hour, minute) = DEFAULT_START_TIME;
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// 解碼並驗證一筆來源記錄
pub fn draft_schedule(index: usize, record: &Record, max_capacity: u32) -> Result<ScheduleDraft> {
    let feed = FeedRecord::try_from(record).map_err(|e| rejected("decode", e.to_string()))?;

    let venue = draft_venue(&feed.venue, max_capacity)?;

    let date = parse_date(&feed.date)
        .ok_or_else(|| rejected("date", format!("invalid performance date '{}'", feed.date)))?;

    let open_time = match feed.open_time.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(text) => Some(
            parse_time(text).ok_or_else(|| rejected("time", format!("invalid open time '{}'", text)))?,
        ),
        None => None,
    };

    let start_time = match feed.start_time.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(text) => {
            parse_time(text).ok_or_else(|| rejected("time", format!("invalid start time '{}'", text)))?
        }
        None => default_start_time(),
    };

    let performers = draft_performers(&feed.performers);
    if performers.is_empty() {
        return Err(rejected(
            "performers",
            format!("no valid performers for {} on {}", venue.name, date),
        ));
    }

    let ticket = feed
        .context
        .as_deref()
        .and_then(ticket::extract_ticket_info);

    Ok(ScheduleDraft {
        source_index: index,
        venue,
        performance_name: feed.performance_name.unwrap_or_default().trim().to_string(),
        date,
        open_time,
        start_time,
        presale_price: feed.presale_price,
        door_price: feed.door_price,
        performers,
        ticket,
    })
}

fn draft_venue(venue: &FeedVenue, max_capacity: u32) -> Result<VenueDraft> {
    let name = venue.name.trim();
    if name.is_empty() {
        return Err(rejected("venue", "venue name is missing"));
    }
    if venue.website.trim().is_empty() {
        return Err(rejected("venue", format!("venue '{}' has no website", name)));
    }

    // 0 或未提供表示容量未知
    let capacity = venue.capacity.unwrap_or(0);
    if capacity > max_capacity {
        return Err(rejected(
            "venue",
            format!(
                "venue '{}' capacity {} exceeds maximum {}",
                name, capacity, max_capacity
            ),
        ));
    }

    Ok(VenueDraft {
        name: name.to_string(),
        name_kana: venue.name_kana.trim().to_string(),
        name_romaji: venue.name_romaji.trim().to_string(),
        website: venue.website.trim().to_string(),
        capacity,
        address: venue.address.trim().to_string(),
        phone_number: venue.phone_number.trim().to_string(),
        opened_date: venue.opened_date.as_deref().and_then(parse_date),
    })
}

fn draft_performers(performers: &FeedPerformers) -> Vec<PerformerDraft> {
    let mut drafts: Vec<PerformerDraft> = Vec::new();

    let mut push = |draft: Option<PerformerDraft>| {
        if let Some(draft) = draft {
            if !drafts.iter().any(|d| d.name == draft.name) {
                drafts.push(draft);
            }
        }
    };

    match performers {
        FeedPerformers::Text(text) => {
            for name in names::split_performers(text) {
                push(performer_from_name(&name));
            }
        }
        FeedPerformers::List(items) => {
            for item in items {
                match item {
                    FeedPerformer::Name(text) => {
                        for name in names::split_performers(text) {
                            push(performer_from_name(&name));
                        }
                    }
                    FeedPerformer::Detail(detail) => push(performer_from_detail(detail)),
                }
            }
        }
    }

    drafts
}

/// 清理名稱後套用名稱標記，任何一道過濾沒通過就回傳 None
fn performer_from_name(raw: &str) -> Option<PerformerDraft> {
    let cleaned = names::clean_performer_name(raw);
    if cleaned.is_empty() || !names::is_valid_performer_name(&cleaned) {
        tracing::debug!("⏭️ Skipping performer text '{}'", raw);
        return None;
    }

    let mut draft = PerformerDraft {
        name: cleaned,
        ..Default::default()
    };
    names::apply_name_notation(&mut draft);

    if !names::is_valid_artist_name(&draft.name) {
        tracing::debug!("⏭️ '{}' does not look like an artist name", draft.name);
        return None;
    }
    Some(draft)
}

fn performer_from_detail(detail: &FeedPerformerDetail) -> Option<PerformerDraft> {
    let mut draft = performer_from_name(&detail.name)?;

    // 來源明確提供的欄位優先於名稱標記解析結果
    if !detail.name_kana.trim().is_empty() {
        draft.name_kana = detail.name_kana.trim().to_string();
    }
    if !detail.name_romaji.trim().is_empty() {
        draft.name_romaji = detail.name_romaji.trim().to_string();
    }
    draft.website = detail.website.trim().to_string();
    draft.email = detail.email.trim().to_string();
    draft.social_links = detail
        .social_links
        .iter()
        .filter(|link| !link.platform.trim().is_empty())
        .map(|link| names::normalize_social_link(&link.platform, &link.url, link.platform_id.as_deref()))
        .collect();
    draft.songs = detail.songs.iter().filter_map(draft_song).collect();

    Some(draft)
}

fn draft_song(song: &FeedSong) -> Option<SongDraft> {
    if song.title.trim().is_empty() {
        return None;
    }

    Some(SongDraft {
        title: song.title.trim().to_string(),
        youtube_video_id: song.youtube_video_id.trim().to_string(),
        youtube_url: song.youtube_url.trim().to_string(),
        view_count: song.view_count,
        duration_seconds: song.duration_seconds,
        release_date: song.release_date.as_deref().and_then(parse_date),
        genre: song.genre.trim().to_string(),
    })
}
