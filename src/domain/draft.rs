use crate::domain::model::{SocialLink, TicketPurchaseInfo};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// 匯入時整理好、尚未寫入目錄的資料
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VenueDraft {
    pub name: String,
    pub name_kana: String,
    pub name_romaji: String,
    pub website: String,
    pub capacity: u32,
    pub address: String,
    pub phone_number: String,
    pub opened_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SongDraft {
    pub title: String,
    pub youtube_video_id: String,
    pub youtube_url: String,
    pub view_count: Option<u64>,
    pub duration_seconds: Option<u32>,
    pub release_date: Option<NaiveDate>,
    pub genre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformerDraft {
    pub name: String,
    pub name_kana: String,
    pub name_romaji: String,
    pub website: String,
    pub email: String,
    pub social_links: Vec<SocialLink>,
    pub songs: Vec<SongDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDraft {
    /// 來源陣列中的位置
    pub source_index: usize,
    pub venue: VenueDraft,
    pub performance_name: String,
    pub date: NaiveDate,
    pub open_time: Option<NaiveTime>,
    pub start_time: NaiveTime,
    pub presale_price: Option<u32>,
    pub door_price: Option<u32>,
    pub performers: Vec<PerformerDraft>,
    pub ticket: Option<TicketPurchaseInfo>,
}

/// 無法匯入的記錄，index 為來源陣列中的位置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportBatch {
    pub record_count: usize,
    pub schedules: Vec<ScheduleDraft>,
    pub rejections: Vec<Rejection>,
}

impl ImportBatch {
    pub fn reject(&mut self, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("⏭️ Record #{} rejected: {}", index, reason);
        self.rejections.push(Rejection { index, reason });
    }
}
