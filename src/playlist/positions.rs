use crate::catalog::Catalog;
use crate::domain::month::YearMonth;
use crate::utils::error::{HakoakeError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionChange {
    pub performer_name: String,
    pub song_id: u64,
    pub old_position: u32,
    pub new_position: u32,
    pub is_spotlight: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistFix {
    pub playlist_id: u64,
    pub month: YearMonth,
    pub changes: Vec<PositionChange>,
}

impl PlaylistFix {
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Playlist {} ({})", self.playlist_id, self.month)];
        if self.changes.is_empty() {
            lines.push("  No changes needed".to_string());
        }
        for change in &self.changes {
            lines.push(format!(
                "  {}: {} -> {}{}",
                change.performer_name,
                change.old_position,
                change.new_position,
                if change.is_spotlight { " (spotlight)" } else { "" }
            ));
        }
        lines.join("\n")
    }
}

/// 一般項目在前、spotlight 在後，重新編號為 1..n
pub fn fix_positions(
    catalog: &mut Catalog,
    playlist_id: Option<u64>,
    dry_run: bool,
) -> Result<Vec<PlaylistFix>> {
    let targets: Vec<(u64, YearMonth)> = match playlist_id {
        Some(id) => {
            let playlist = catalog.playlist(id).ok_or_else(|| HakoakeError::NotFound {
                entity: "MonthlyPlaylist",
                id: id.to_string(),
            })?;
            vec![(playlist.id, playlist.month)]
        }
        None => catalog.playlists().iter().map(|p| (p.id, p.month)).collect(),
    };

    let mut fixes = Vec::new();
    for (id, month) in targets {
        let mut indices: Vec<usize> = catalog
            .playlist_entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.playlist_id == id)
            .map(|(i, _)| i)
            .collect();
        indices.sort_by_key(|&i| {
            let entry = &catalog.playlist_entries[i];
            (entry.is_spotlight, entry.position)
        });

        let mut changes = Vec::new();
        for (offset, &index) in indices.iter().enumerate() {
            let entry = &catalog.playlist_entries[index];
            let new_position = offset as u32 + 1;
            if entry.position == new_position {
                continue;
            }
            let performer_name = catalog
                .song(entry.song_id)
                .and_then(|s| catalog.performer(s.performer_id))
                .map(|p| p.name.clone())
                .unwrap_or_default();
            changes.push((
                index,
                PositionChange {
                    performer_name,
                    song_id: entry.song_id,
                    old_position: entry.position,
                    new_position,
                    is_spotlight: entry.is_spotlight,
                },
            ));
        }

        if !dry_run {
            for (index, change) in &changes {
                catalog.playlist_entries[*index].position = change.new_position;
            }
        }
        if !changes.is_empty() {
            tracing::info!(
                "🔢 {} {} positions in playlist {}",
                if dry_run { "Would fix" } else { "Fixed" },
                changes.len(),
                id
            );
        }

        fixes.push(PlaylistFix {
            playlist_id: id,
            month,
            changes: changes.into_iter().map(|(_, change)| change).collect(),
        });
    }

    Ok(fixes)
}
