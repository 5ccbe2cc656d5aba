use crate::domain::month::YearMonth;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 排程來源的原始記錄，欄位在 transform 階段才解析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteProcessingState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl WebsiteProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    #[default]
    Pending,
    Success,
    Error,
    Timeout,
}

impl CollectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveHouseWebsite {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub state: WebsiteProcessingState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveHouse {
    pub id: u64,
    pub website_id: u64,
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub name_romaji: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub opened_date: Option<NaiveDate>,
    #[serde(default)]
    pub closed_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_collection_state: CollectionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    #[serde(default)]
    pub platform_id: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub name_romaji: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    /// 連續落選的輪替次數，入選時歸零
    #[serde(default)]
    pub playlist_weight: u32,
    pub playlist_weight_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformerSong {
    pub id: u64,
    pub performer_id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub youtube_video_id: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub youtube_view_count: Option<u64>,
    #[serde(default)]
    pub youtube_duration_seconds: Option<u32>,
}

impl PerformerSong {
    pub fn has_video(&self) -> bool {
        !self.youtube_video_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketPurchaseInfo {
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub sales_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketService {
    Peatix,
    Eventbrite,
    Tiget,
    EPlus,
    Pia,
    Lawson,
    CnPlayguide,
    TicketPort,
    LivePocket,
    Zaiko,
    Other,
}

impl TicketService {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Peatix => "Peatix",
            Self::Eventbrite => "Eventbrite",
            Self::Tiget => "tiget",
            Self::EPlus => "e+",
            Self::Pia => "チケットぴあ",
            Self::Lawson => "ローソンチケット",
            Self::CnPlayguide => "CNプレイガイド",
            Self::TicketPort => "チケットポート",
            Self::LivePocket => "LivePocket",
            Self::Zaiko => "ZAIKO",
            Self::Other => "チケット購入",
        }
    }
}

impl TicketPurchaseInfo {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// 依售票網址判斷售票平台
    pub fn service(&self) -> Option<TicketService> {
        let url = self.url.as_deref()?.to_lowercase();
        if url.is_empty() {
            return None;
        }

        let service = if url.contains("peatix.com") {
            TicketService::Peatix
        } else if url.contains("eventbrite.com") || url.contains("eventbrite.co.jp") {
            TicketService::Eventbrite
        } else if url.contains("tiget.net") {
            TicketService::Tiget
        } else if url.contains("e-plus.jp") || url.contains("eplus.jp") {
            TicketService::EPlus
        } else if url.contains("pia.jp") || url.contains("pia.co.jp") {
            TicketService::Pia
        } else if url.contains("lawson") || url.contains("l-tike") {
            TicketService::Lawson
        } else if url.contains("cnplayguide") {
            TicketService::CnPlayguide
        } else if url.contains("ticketport") {
            TicketService::TicketPort
        } else if url.contains("livepocket") {
            TicketService::LivePocket
        } else if url.contains("zaiko.io") {
            TicketService::Zaiko
        } else {
            TicketService::Other
        };
        Some(service)
    }

    /// 以新資料補上欄位，已有的值會被覆蓋
    pub fn merge(&mut self, other: &TicketPurchaseInfo) {
        if other.contact_email.is_some() {
            self.contact_email = other.contact_email.clone();
        }
        if other.contact_phone.is_some() {
            self.contact_phone = other.contact_phone.clone();
        }
        if other.url.is_some() {
            self.url = other.url.clone();
        }
        if other.price.is_some() {
            self.price = other.price;
        }
        if other.sales_start.is_some() {
            self.sales_start = other.sales_start;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSchedule {
    pub id: u64,
    pub live_house_id: u64,
    #[serde(default)]
    pub performance_name: String,
    pub performance_date: NaiveDate,
    #[serde(default)]
    pub open_time: Option<NaiveTime>,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub presale_price: Option<u32>,
    #[serde(default)]
    pub door_price: Option<u32>,
    #[serde(default)]
    pub performer_ids: Vec<u64>,
    #[serde(default)]
    pub ticket: Option<TicketPurchaseInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPlaylist {
    pub id: u64,
    pub month: YearMonth,
    #[serde(default)]
    pub youtube_playlist_id: String,
    #[serde(default)]
    pub youtube_playlist_url: String,
    #[serde(default)]
    pub youtube_channel_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPlaylistEntry {
    pub playlist_id: u64,
    pub position: u32,
    pub song_id: u64,
    #[serde(default)]
    pub is_spotlight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(url: &str) -> TicketPurchaseInfo {
        TicketPurchaseInfo {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ticket_service_detection() {
        assert_eq!(
            ticket("https://peatix.com/event/123").service(),
            Some(TicketService::Peatix)
        );
        assert_eq!(
            ticket("https://eplus.jp/sf/detail/0001").service(),
            Some(TicketService::EPlus)
        );
        assert_eq!(
            ticket("https://l-tike.com/order/?gLcode=1").service(),
            Some(TicketService::Lawson)
        );
        assert_eq!(
            ticket("https://livehouse.example.jp/reserve").service(),
            Some(TicketService::Other)
        );
        assert_eq!(TicketPurchaseInfo::default().service(), None);
        assert_eq!(TicketService::Pia.label(), "チケットぴあ");
    }

    #[test]
    fn test_ticket_merge_overwrites_present_fields_only() {
        let mut base = TicketPurchaseInfo {
            contact_email: Some("old@example.com".to_string()),
            price: Some(2500),
            ..Default::default()
        };
        base.merge(&TicketPurchaseInfo {
            price: Some(3000),
            url: Some("https://tiget.net/events/1".to_string()),
            ..Default::default()
        });

        assert_eq!(base.contact_email.as_deref(), Some("old@example.com"));
        assert_eq!(base.price, Some(3000));
        assert_eq!(base.service(), Some(TicketService::Tiget));
    }
}
