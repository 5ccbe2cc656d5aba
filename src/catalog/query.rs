use crate::catalog::{clean_name_field, Catalog};
use crate::domain::draft::PerformerDraft;
use crate::domain::model::{
    LiveHouse, LiveHouseWebsite, MonthlyPlaylist, MonthlyPlaylistEntry, PerformanceSchedule,
    Performer, PerformerSong,
};
use crate::domain::month::YearMonth;
use std::collections::HashSet;

impl Catalog {
    pub fn performer(&self, id: u64) -> Option<&Performer> {
        self.performers.iter().find(|p| p.id == id)
    }

    pub fn song(&self, id: u64) -> Option<&PerformerSong> {
        self.songs.iter().find(|s| s.id == id)
    }

    pub fn schedule(&self, id: u64) -> Option<&PerformanceSchedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn live_house(&self, id: u64) -> Option<&LiveHouse> {
        self.live_houses.iter().find(|h| h.id == id)
    }

    pub fn website(&self, id: u64) -> Option<&LiveHouseWebsite> {
        self.websites.iter().find(|w| w.id == id)
    }

    /// live house 對應的網站網址，找不到時為空字串
    pub fn venue_url(&self, live_house_id: u64) -> &str {
        self.live_house(live_house_id)
            .and_then(|h| self.website(h.website_id))
            .map(|w| w.url.as_str())
            .unwrap_or("")
    }

    pub fn performer_by_name(&self, name: &str) -> Option<&Performer> {
        self.performers.iter().find(|p| p.name == name)
    }

    /// 與 find_or_create_performer 相同的比對規則
    pub fn knows_performer(&self, draft: &PerformerDraft) -> bool {
        let name = clean_name_field(&draft.name);
        let romaji = clean_name_field(&draft.name_romaji);
        self.find_performer_index(&name, &romaji).is_some()
    }

    /// 當月的演出，依日期、開演時間排序
    pub fn performances_in(&self, month: YearMonth) -> Vec<&PerformanceSchedule> {
        let mut schedules: Vec<&PerformanceSchedule> = self
            .schedules
            .iter()
            .filter(|s| month.contains(s.performance_date))
            .collect();
        schedules.sort_by_key(|s| (s.performance_date, s.start_time, s.id));
        schedules
    }

    /// 當月有演出的表演者（不重複），依名稱排序
    pub fn performers_in(&self, month: YearMonth) -> Vec<&Performer> {
        let ids: HashSet<u64> = self
            .performances_in(month)
            .into_iter()
            .flat_map(|s| s.performer_ids.iter().copied())
            .collect();
        let mut performers: Vec<&Performer> =
            self.performers.iter().filter(|p| ids.contains(&p.id)).collect();
        performers.sort_by(|a, b| a.name.cmp(&b.name));
        performers
    }

    pub fn performer_performs_in(&self, performer_id: u64, month: YearMonth) -> bool {
        self.schedules.iter().any(|s| {
            month.contains(s.performance_date) && s.performer_ids.contains(&performer_id)
        })
    }

    /// 表演者在當月的演出
    pub fn performances_of(&self, performer_id: u64, month: YearMonth) -> Vec<&PerformanceSchedule> {
        self.performances_in(month)
            .into_iter()
            .filter(|s| s.performer_ids.contains(&performer_id))
            .collect()
    }

    pub fn songs_of(&self, performer_id: u64) -> Vec<&PerformerSong> {
        self.songs
            .iter()
            .filter(|s| s.performer_id == performer_id)
            .collect()
    }

    pub fn playlist(&self, id: u64) -> Option<&MonthlyPlaylist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn playlist_for(&self, month: YearMonth) -> Option<&MonthlyPlaylist> {
        self.playlists.iter().find(|p| p.month == month)
    }

    /// 播放清單的項目，依位置排序
    pub fn entries_of(&self, playlist_id: u64) -> Vec<&MonthlyPlaylistEntry> {
        let mut entries: Vec<&MonthlyPlaylistEntry> = self
            .playlist_entries
            .iter()
            .filter(|e| e.playlist_id == playlist_id)
            .collect();
        entries.sort_by_key(|e| e.position);
        entries
    }

    pub fn song_in_any_playlist(&self, song_id: u64) -> bool {
        self.playlist_entries.iter().any(|e| e.song_id == song_id)
    }

    pub fn performer_in_playlist(&self, performer_id: u64, playlist_id: u64) -> bool {
        self.playlist_entries.iter().any(|e| {
            e.playlist_id == playlist_id
                && self
                    .song(e.song_id)
                    .is_some_and(|s| s.performer_id == performer_id)
        })
    }

    /// 表演者出現在其他播放清單中的次數
    pub fn appearances_excluding(&self, performer_id: u64, playlist_id: u64) -> usize {
        self.playlist_entries
            .iter()
            .filter(|e| e.playlist_id != playlist_id)
            .filter(|e| {
                self.song(e.song_id)
                    .is_some_and(|s| s.performer_id == performer_id)
            })
            .count()
    }
}
