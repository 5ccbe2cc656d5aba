// 目錄：live house、表演者、歌曲、排程與播放清單的單一 JSON 文件

pub mod maintenance;
pub mod query;
pub mod store;

pub use maintenance::{ClearedCollection, CollectionReset};
pub use store::CatalogStore;

use crate::domain::draft::{PerformerDraft, ScheduleDraft, SongDraft, VenueDraft};
use crate::domain::model::{
    CollectionState, LiveHouse, LiveHouseWebsite, MonthlyPlaylist, MonthlyPlaylistEntry,
    PerformanceSchedule, Performer, PerformerSong, SocialLink, WebsiteProcessingState,
};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static BAND_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^BAND:\s*").unwrap());

/// 每種實體各自遞增的 id，刪除後也不會重用
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSequences {
    pub website: u64,
    pub live_house: u64,
    pub performer: u64,
    pub song: u64,
    pub schedule: u64,
    pub playlist: u64,
}

fn allocate(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub(crate) sequences: IdSequences,
    #[serde(default)]
    pub(crate) websites: Vec<LiveHouseWebsite>,
    #[serde(default)]
    pub(crate) live_houses: Vec<LiveHouse>,
    #[serde(default)]
    pub(crate) performers: Vec<Performer>,
    #[serde(default)]
    pub(crate) songs: Vec<PerformerSong>,
    #[serde(default)]
    pub(crate) schedules: Vec<PerformanceSchedule>,
    #[serde(default)]
    pub(crate) playlists: Vec<MonthlyPlaylist>,
    #[serde(default)]
    pub(crate) playlist_entries: Vec<MonthlyPlaylistEntry>,
}

/// 清理表演者名稱欄位：去空白、去結尾斜線、去掉 `BAND:` 前綴
pub fn clean_name_field(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches(['/', '\\']);
    BAND_PREFIX.replace(trimmed, "").trim().to_string()
}

fn clean_song_title(title: &str) -> String {
    title.trim().trim_end_matches(['/', '\\']).trim().to_string()
}

fn fill_if_empty(target: &mut String, value: &str) {
    if target.is_empty() && !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}

/// 以 (platform, platform_id) 去重
fn merge_social_links(target: &mut Vec<SocialLink>, links: &[SocialLink]) {
    for link in links {
        let duplicate = target
            .iter()
            .any(|existing| existing.platform == link.platform && existing.platform_id == link.platform_id);
        if !duplicate {
            target.push(link.clone());
        }
    }
}

fn overwrite_if_present(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn websites(&self) -> &[LiveHouseWebsite] {
        &self.websites
    }

    pub fn live_houses(&self) -> &[LiveHouse] {
        &self.live_houses
    }

    pub fn performers(&self) -> &[Performer] {
        &self.performers
    }

    pub fn songs(&self) -> &[PerformerSong] {
        &self.songs
    }

    pub fn schedules(&self) -> &[PerformanceSchedule] {
        &self.schedules
    }

    pub fn playlists(&self) -> &[MonthlyPlaylist] {
        &self.playlists
    }

    pub fn playlist_entries(&self) -> &[MonthlyPlaylistEntry] {
        &self.playlist_entries
    }

    pub fn upsert_website(&mut self, url: &str) -> u64 {
        let url = url.trim();
        if let Some(existing) = self.websites.iter().find(|w| w.url == url) {
            return existing.id;
        }

        let id = allocate(&mut self.sequences.website);
        self.websites.push(LiveHouseWebsite {
            id,
            url: url.to_string(),
            state: WebsiteProcessingState::NotStarted,
        });
        id
    }

    /// 先以網站比對，找不到再以名稱比對
    pub fn upsert_live_house(&mut self, website_id: u64, draft: &VenueDraft) -> u64 {
        let name = draft.name.trim();
        let position = self
            .live_houses
            .iter()
            .position(|h| h.website_id == website_id)
            .or_else(|| self.live_houses.iter().position(|h| h.name == name));

        match position {
            Some(index) => {
                let house = &mut self.live_houses[index];
                overwrite_if_present(&mut house.name, name);
                overwrite_if_present(&mut house.name_kana, &draft.name_kana);
                overwrite_if_present(&mut house.name_romaji, &draft.name_romaji);
                overwrite_if_present(&mut house.address, &draft.address);
                overwrite_if_present(&mut house.phone_number, &draft.phone_number);
                if draft.capacity > 0 {
                    house.capacity = draft.capacity;
                }
                if draft.opened_date.is_some() {
                    house.opened_date = draft.opened_date;
                }
                house.id
            }
            None => {
                let id = allocate(&mut self.sequences.live_house);
                self.live_houses.push(LiveHouse {
                    id,
                    website_id,
                    name: name.to_string(),
                    name_kana: draft.name_kana.trim().to_string(),
                    name_romaji: draft.name_romaji.trim().to_string(),
                    phone_number: draft.phone_number.trim().to_string(),
                    address: draft.address.trim().to_string(),
                    capacity: draft.capacity,
                    opened_date: draft.opened_date,
                    closed_date: None,
                    last_collected_at: None,
                    last_collection_state: CollectionState::Pending,
                });
                id
            }
        }
    }

    /// 依名稱尋找表演者，找不到再以羅馬字（不分大小寫）比對，都沒有才建立。
    /// 回傳 (id, 是否新建)
    pub fn find_or_create_performer(
        &mut self,
        draft: &PerformerDraft,
        now: DateTime<Utc>,
    ) -> (u64, bool) {
        let name = clean_name_field(&draft.name);
        let romaji = clean_name_field(&draft.name_romaji);
        let kana = clean_name_field(&draft.name_kana);

        let position = self.find_performer_index(&name, &romaji);

        match position {
            Some(index) => {
                let performer = &mut self.performers[index];
                fill_if_empty(&mut performer.website, &draft.website);
                fill_if_empty(&mut performer.email, &draft.email);
                fill_if_empty(&mut performer.name_kana, &kana);
                fill_if_empty(&mut performer.name_romaji, &romaji);
                merge_social_links(&mut performer.social_links, &draft.social_links);
                (performer.id, false)
            }
            None => {
                let id = allocate(&mut self.sequences.performer);
                let mut social_links = Vec::new();
                merge_social_links(&mut social_links, &draft.social_links);
                self.performers.push(Performer {
                    id,
                    name,
                    name_kana: kana,
                    name_romaji: romaji,
                    phone_number: String::new(),
                    email: draft.email.trim().to_string(),
                    website: draft.website.trim().to_string(),
                    social_links,
                    playlist_weight: 0,
                    playlist_weight_updated_at: now,
                });
                (id, true)
            }
        }
    }

    pub(crate) fn find_performer_index(&self, name: &str, romaji: &str) -> Option<usize> {
        self.performers
            .iter()
            .position(|p| p.name == name)
            .or_else(|| {
                if romaji.is_empty() {
                    return None;
                }
                let romaji = romaji.to_lowercase();
                self.performers
                    .iter()
                    .position(|p| !p.name_romaji.is_empty() && p.name_romaji.to_lowercase() == romaji)
            })
    }

    /// 有影片 id 時以影片 id 比對，否則以曲名比對
    pub fn upsert_song(&mut self, performer_id: u64, draft: &SongDraft) -> u64 {
        let title = clean_song_title(&draft.title);
        let video_id = draft.youtube_video_id.trim();

        let position = if video_id.is_empty() {
            self.songs
                .iter()
                .position(|s| s.performer_id == performer_id && s.title == title)
        } else {
            self.songs
                .iter()
                .position(|s| s.performer_id == performer_id && s.youtube_video_id == video_id)
        };

        match position {
            Some(index) => {
                let song = &mut self.songs[index];
                overwrite_if_present(&mut song.title, &title);
                overwrite_if_present(&mut song.youtube_video_id, video_id);
                overwrite_if_present(&mut song.youtube_url, &draft.youtube_url);
                overwrite_if_present(&mut song.genre, &draft.genre);
                if draft.view_count.is_some() {
                    song.youtube_view_count = draft.view_count;
                }
                if draft.duration_seconds.is_some() {
                    song.youtube_duration_seconds = draft.duration_seconds;
                }
                if draft.release_date.is_some() {
                    song.release_date = draft.release_date;
                }
                song.id
            }
            None => {
                let id = allocate(&mut self.sequences.song);
                self.songs.push(PerformerSong {
                    id,
                    performer_id,
                    title,
                    release_date: draft.release_date,
                    genre: draft.genre.trim().to_string(),
                    youtube_video_id: video_id.to_string(),
                    youtube_url: draft.youtube_url.trim().to_string(),
                    youtube_view_count: draft.view_count,
                    youtube_duration_seconds: draft.duration_seconds,
                });
                id
            }
        }
    }

    /// 以 (live house, 日期, 開演時間) 為鍵
    pub fn upsert_schedule(
        &mut self,
        live_house_id: u64,
        draft: &ScheduleDraft,
        performer_ids: &[u64],
    ) -> u64 {
        let position = self.schedules.iter().position(|s| {
            s.live_house_id == live_house_id
                && s.performance_date == draft.date
                && s.start_time == draft.start_time
        });

        let index = match position {
            Some(index) => {
                let schedule = &mut self.schedules[index];
                overwrite_if_present(&mut schedule.performance_name, &draft.performance_name);
                if draft.open_time.is_some() {
                    schedule.open_time = draft.open_time;
                }
                if draft.presale_price.is_some() {
                    schedule.presale_price = draft.presale_price;
                }
                if draft.door_price.is_some() {
                    schedule.door_price = draft.door_price;
                }
                index
            }
            None => {
                let id = allocate(&mut self.sequences.schedule);
                self.schedules.push(PerformanceSchedule {
                    id,
                    live_house_id,
                    performance_name: draft.performance_name.trim().to_string(),
                    performance_date: draft.date,
                    open_time: draft.open_time,
                    start_time: draft.start_time,
                    presale_price: draft.presale_price,
                    door_price: draft.door_price,
                    performer_ids: Vec::new(),
                    ticket: None,
                });
                self.schedules.len() - 1
            }
        };

        let schedule = &mut self.schedules[index];
        for performer_id in performer_ids {
            if !schedule.performer_ids.contains(performer_id) {
                schedule.performer_ids.push(*performer_id);
            }
        }

        if let Some(ticket) = draft.ticket.as_ref().filter(|t| !t.is_empty()) {
            schedule
                .ticket
                .get_or_insert_with(Default::default)
                .merge(ticket);
        }

        schedule.id
    }

    pub fn record_collection(&mut self, live_house_id: u64, state: CollectionState, at: DateTime<Utc>) {
        let Some(house) = self.live_houses.iter_mut().find(|h| h.id == live_house_id) else {
            return;
        };
        house.last_collected_at = Some(at);
        house.last_collection_state = state;

        let website_state = match state {
            CollectionState::Success => WebsiteProcessingState::Completed,
            CollectionState::Pending => WebsiteProcessingState::InProgress,
            CollectionState::Error | CollectionState::Timeout => WebsiteProcessingState::Failed,
        };
        let website_id = house.website_id;
        if let Some(website) = self.websites.iter_mut().find(|w| w.id == website_id) {
            website.state = website_state;
        }
    }

    /// 該網站的 live house 是否已在 `day` 成功收集過
    pub fn collected_successfully_on(&self, website_url: &str, day: NaiveDate) -> bool {
        let Some(website) = self.websites.iter().find(|w| w.url == website_url.trim()) else {
            return false;
        };
        self.live_houses.iter().any(|h| {
            h.website_id == website.id
                && h.last_collection_state == CollectionState::Success
                && h.last_collected_at.map(|at| at.date_naive()) == Some(day)
        })
    }

    pub(crate) fn insert_playlist(&mut self, playlist: MonthlyPlaylist) -> u64 {
        let id = allocate(&mut self.sequences.playlist);
        self.playlists.push(MonthlyPlaylist { id, ..playlist });
        id
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::draft::{PerformerDraft, ScheduleDraft, SongDraft, VenueDraft};
    use chrono::{NaiveTime, TimeZone};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap()
    }

    pub fn venue(name: &str, url: &str) -> VenueDraft {
        VenueDraft {
            name: name.to_string(),
            website: url.to_string(),
            capacity: 200,
            ..Default::default()
        }
    }

    pub fn song(title: &str, video_id: &str, views: Option<u64>, seconds: Option<u32>) -> SongDraft {
        SongDraft {
            title: title.to_string(),
            youtube_video_id: video_id.to_string(),
            youtube_url: if video_id.is_empty() {
                String::new()
            } else {
                format!("https://www.youtube.com/watch?v={}", video_id)
            },
            view_count: views,
            duration_seconds: seconds,
            ..Default::default()
        }
    }

    pub fn performer(name: &str, romaji: &str, songs: Vec<SongDraft>) -> PerformerDraft {
        PerformerDraft {
            name: name.to_string(),
            name_romaji: romaji.to_string(),
            songs,
            ..Default::default()
        }
    }

    pub fn schedule(venue: VenueDraft, date: &str, performers: Vec<PerformerDraft>) -> ScheduleDraft {
        ScheduleDraft {
            source_index: 0,
            venue,
            performance_name: String::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open_time: NaiveTime::from_hms_opt(18, 30, 0),
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            presale_price: Some(2500),
            door_price: Some(3000),
            performers,
            ticket: None,
        }
    }

    /// 直接寫入排程與表演者，略過匯入流程
    pub fn add_schedule(catalog: &mut Catalog, draft: &ScheduleDraft) -> u64 {
        let website_id = catalog.upsert_website(&draft.venue.website);
        let house_id = catalog.upsert_live_house(website_id, &draft.venue);
        let mut ids = Vec::new();
        for performer in &draft.performers {
            let (id, _) = catalog.find_or_create_performer(performer, now());
            for song in &performer.songs {
                catalog.upsert_song(id, song);
            }
            ids.push(id);
        }
        catalog.upsert_schedule(house_id, draft, &ids)
    }
}
