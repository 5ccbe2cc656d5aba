use crate::catalog::Catalog;
use crate::domain::model::MonthlyPlaylistEntry;
use crate::utils::error::{HakoakeError, Result};
use serde::Serialize;

pub const DEFAULT_MAX_MINUTES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotlightEntry {
    pub playlist_id: u64,
    pub performer_id: u64,
    pub performer_name: String,
    pub song_id: u64,
    pub song_title: String,
    pub youtube_url: String,
    pub view_count: u64,
    pub position: u32,
    /// 表演者在其他播放清單出現的次數
    pub other_appearances: usize,
}

/// 把表演者尚未用過的熱門歌曲加到播放清單最後，權重不變
pub fn add_spotlight(
    catalog: &mut Catalog,
    playlist_id: u64,
    performer_id: u64,
    max_minutes: u32,
) -> Result<SpotlightEntry> {
    let playlist = catalog
        .playlist(playlist_id)
        .ok_or_else(|| HakoakeError::NotFound {
            entity: "MonthlyPlaylist",
            id: playlist_id.to_string(),
        })?;
    let month = playlist.month;

    let performer = catalog
        .performer(performer_id)
        .ok_or_else(|| HakoakeError::NotFound {
            entity: "Performer",
            id: performer_id.to_string(),
        })?;
    let performer_name = performer.name.clone();

    if !catalog.performer_performs_in(performer_id, month) {
        return Err(HakoakeError::PlaylistRuleError {
            message: format!("{} has no performances in {}", performer_name, month),
        });
    }
    if catalog.performer_in_playlist(performer_id, playlist_id) {
        return Err(HakoakeError::PlaylistRuleError {
            message: format!("{} is already in the {} playlist", performer_name, month),
        });
    }

    let max_seconds = max_minutes.saturating_mul(60);
    let song = catalog
        .songs_of(performer_id)
        .into_iter()
        .filter(|s| s.youtube_view_count.is_some())
        .filter(|s| s.youtube_duration_seconds.is_some_and(|d| d <= max_seconds))
        .filter(|s| !catalog.song_in_any_playlist(s.id))
        .min_by(|a, b| {
            b.youtube_view_count
                .cmp(&a.youtube_view_count)
                .then_with(|| a.title.cmp(&b.title))
        })
        .ok_or_else(|| HakoakeError::PlaylistRuleError {
            message: format!(
                "No available songs for {} (unused, with view count, at most {} minutes)",
                performer_name, max_minutes
            ),
        })?;

    let entry = SpotlightEntry {
        playlist_id,
        performer_id,
        performer_name,
        song_id: song.id,
        song_title: song.title.clone(),
        youtube_url: song.youtube_url.clone(),
        view_count: song.youtube_view_count.unwrap_or(0),
        position: catalog
            .entries_of(playlist_id)
            .last()
            .map(|e| e.position + 1)
            .unwrap_or(1),
        other_appearances: catalog.appearances_excluding(performer_id, playlist_id),
    };

    catalog.playlist_entries.push(MonthlyPlaylistEntry {
        playlist_id,
        position: entry.position,
        song_id: entry.song_id,
        is_spotlight: true,
    });

    tracing::info!(
        "🔦 Added spotlight {} - {} at position {}",
        entry.performer_name,
        entry.song_title,
        entry.position
    );
    Ok(entry)
}
