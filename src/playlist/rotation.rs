use crate::catalog::Catalog;
use crate::domain::model::{MonthlyPlaylist, MonthlyPlaylistEntry, PerformerSong};
use crate::domain::month::YearMonth;
use crate::utils::error::{HakoakeError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;

pub const DEFAULT_PLAYLIST_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationPick {
    pub performer_id: u64,
    pub performer_name: String,
    pub weight: u32,
    pub song_id: u64,
    pub song_title: String,
    pub video_id: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotationPlan {
    pub month: YearMonth,
    pub size: usize,
    pub picks: Vec<RotationPick>,
    /// 因影片重複而略過的表演者
    pub skipped: Vec<String>,
    pub increment_count: usize,
}

impl RotationPlan {
    pub fn reset_count(&self) -> usize {
        self.picks.len()
    }

    pub fn is_short(&self) -> bool {
        self.picks.len() < self.size
    }

    /// dry-run 摘要
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Monthly playlist for {}", self.month)];
        for pick in &self.picks {
            lines.push(format!(
                "  {}: {} (views: {}, weight: {})",
                pick.performer_name, pick.song_title, pick.view_count, pick.weight
            ));
        }
        for name in &self.skipped {
            lines.push(format!("  Skipped {}: duplicate video", name));
        }
        if self.is_short() {
            lines.push(format!(
                "Only {} unique performers/songs found (expected {})",
                self.picks.len(),
                self.size
            ));
        }
        lines.push(format!("Would create playlist with {} songs", self.picks.len()));
        lines.push(format!(
            "Would reset playlist_weight to 0 for {} performers",
            self.reset_count()
        ));
        lines.push(format!(
            "Would increment playlist_weight for {} non-selected performers",
            self.increment_count
        ));
        lines.join("\n")
    }
}

/// 觀看數最多的歌曲（沒有觀看數視為 0），同數以曲名排序
fn most_popular<'a>(songs: &[&'a PerformerSong]) -> Option<&'a PerformerSong> {
    songs
        .iter()
        .filter(|s| s.has_video())
        .min_by(|a, b| {
            Reverse(a.youtube_view_count.unwrap_or(0))
                .cmp(&Reverse(b.youtube_view_count.unwrap_or(0)))
                .then_with(|| a.title.cmp(&b.title))
        })
        .copied()
}

/// 依權重挑出當月的表演者與歌曲，不修改目錄
pub fn plan_rotation(catalog: &Catalog, month: YearMonth, size: usize) -> Result<RotationPlan> {
    if catalog.playlist_for(month).is_some() {
        return Err(HakoakeError::PlaylistExists {
            month: month.to_string(),
        });
    }

    let mut eligible: Vec<_> = catalog
        .performers_in(month)
        .into_iter()
        .filter(|p| catalog.songs_of(p.id).iter().any(|s| s.has_video()))
        .collect();
    if eligible.is_empty() {
        return Err(HakoakeError::NoEligiblePerformers {
            month: month.to_string(),
        });
    }
    eligible.sort_by(|a, b| {
        b.playlist_weight
            .cmp(&a.playlist_weight)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut picks = Vec::new();
    let mut skipped = Vec::new();
    let mut used_videos = HashSet::new();

    for performer in eligible {
        if picks.len() >= size {
            break;
        }

        let Some(song) = most_popular(&catalog.songs_of(performer.id)) else {
            continue;
        };

        if !used_videos.insert(song.youtube_video_id.clone()) {
            tracing::warn!(
                "⚠️ Skipping {}: duplicate video {}",
                performer.name,
                song.youtube_video_id
            );
            skipped.push(performer.name.clone());
            continue;
        }

        tracing::info!(
            "  {}: {} (views: {}, weight: {})",
            performer.name,
            song.title,
            song.youtube_view_count.unwrap_or(0),
            performer.playlist_weight
        );
        picks.push(RotationPick {
            performer_id: performer.id,
            performer_name: performer.name.clone(),
            weight: performer.playlist_weight,
            song_id: song.id,
            song_title: song.title.clone(),
            video_id: song.youtube_video_id.clone(),
            view_count: song.youtube_view_count.unwrap_or(0),
        });
    }

    if picks.is_empty() {
        return Err(HakoakeError::NoSongsSelected {
            month: month.to_string(),
        });
    }
    if picks.len() < size {
        tracing::warn!(
            "⚠️ Only {} unique performers/songs found (expected {})",
            picks.len(),
            size
        );
    }

    let increment_count = catalog.performers().len() - picks.len();
    Ok(RotationPlan {
        month,
        size,
        picks,
        skipped,
        increment_count,
    })
}

/// 建立播放清單並更新權重：入選者歸零，其餘加一。全部驗證完才修改目錄
pub fn commit_rotation(
    catalog: &mut Catalog,
    plan: &RotationPlan,
    youtube_playlist_id: Option<&str>,
    channel_url: &str,
    now: DateTime<Utc>,
) -> Result<u64> {
    if catalog.playlist_for(plan.month).is_some() {
        return Err(HakoakeError::PlaylistExists {
            month: plan.month.to_string(),
        });
    }
    if plan.picks.is_empty() {
        return Err(HakoakeError::NoSongsSelected {
            month: plan.month.to_string(),
        });
    }
    for pick in &plan.picks {
        if catalog.performer(pick.performer_id).is_none() {
            return Err(HakoakeError::NotFound {
                entity: "Performer",
                id: pick.performer_id.to_string(),
            });
        }
        if catalog.song(pick.song_id).is_none() {
            return Err(HakoakeError::NotFound {
                entity: "PerformerSong",
                id: pick.song_id.to_string(),
            });
        }
    }

    let youtube_playlist_id = youtube_playlist_id.unwrap_or("").trim().to_string();
    let youtube_playlist_url = if youtube_playlist_id.is_empty() {
        String::new()
    } else {
        format!("https://www.youtube.com/playlist?list={}", youtube_playlist_id)
    };

    let playlist_id = catalog.insert_playlist(MonthlyPlaylist {
        id: 0,
        month: plan.month,
        youtube_playlist_id,
        youtube_playlist_url,
        youtube_channel_url: channel_url.to_string(),
        created_at: now,
    });

    for (index, pick) in plan.picks.iter().enumerate() {
        catalog.playlist_entries.push(MonthlyPlaylistEntry {
            playlist_id,
            position: index as u32 + 1,
            song_id: pick.song_id,
            is_spotlight: false,
        });
    }

    let selected: HashSet<u64> = plan.picks.iter().map(|p| p.performer_id).collect();
    for performer in catalog.performers.iter_mut() {
        if selected.contains(&performer.id) {
            performer.playlist_weight = 0;
        } else {
            performer.playlist_weight = performer.playlist_weight.saturating_add(1);
        }
        performer.playlist_weight_updated_at = now;
    }

    tracing::info!(
        "✅ Created playlist {} for {} with {} songs",
        playlist_id,
        plan.month,
        plan.picks.len()
    );
    Ok(playlist_id)
}

/// e.g. "HAKKO-AKKEI November [TOKYO] (2025)"
pub fn playlist_title(month: YearMonth, prefix: &str) -> String {
    format!("{} {} [TOKYO] ({})", prefix, month.month_name(), month.year())
}

pub fn playlist_description(catalog: &Catalog, plan: &RotationPlan) -> String {
    let mut lines = vec![
        format!(
            "Monthly playlist featuring top performers for {}.",
            plan.month.long_name()
        ),
        String::new(),
    ];

    for pick in &plan.picks {
        for performance in catalog.performances_of(pick.performer_id, plan.month) {
            let venue = catalog
                .live_house(performance.live_house_id)
                .map(|h| h.name.as_str())
                .unwrap_or("");
            lines.push(format!(
                "{} {} ({}) @{} - {}",
                pick.performer_name,
                performance.performance_date.format("%Y-%m-%d"),
                performance.performance_date.format("%a").to_string().to_uppercase(),
                venue,
                catalog.venue_url(performance.live_house_id)
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::*;

    fn november() -> YearMonth {
        YearMonth::parse("2025-11").unwrap()
    }

    fn catalog_with(performers: Vec<crate::domain::draft::PerformerDraft>) -> Catalog {
        let mut catalog = Catalog::new();
        add_schedule(
            &mut catalog,
            &schedule(venue("Shelter", "https://shelter.example.jp"), "2025-11-03", performers),
        );
        catalog
    }

    #[test]
    fn test_most_popular_treats_missing_views_as_zero() {
        let catalog = catalog_with(vec![performer(
            "Alpha",
            "",
            vec![
                song("B side", "v2", None, None),
                song("A side", "v1", None, None),
                song("No video", "", Some(1_000_000), None),
            ],
        )]);
        let plan = plan_rotation(&catalog, november(), 5).unwrap();
        assert_eq!(plan.picks[0].song_title, "A side");
        assert_eq!(plan.picks[0].view_count, 0);
    }

    #[test]
    fn test_weight_then_name_ordering_and_size_limit() {
        let mut catalog = catalog_with(
            ["Echo", "Delta", "Charlie", "Bravo", "Alpha", "Foxtrot"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    performer(name, "", vec![song("Hit", &format!("vid{}", i), Some(10), None)])
                })
                .collect(),
        );
        let foxtrot = catalog.performer_by_name("Foxtrot").unwrap().id;
        catalog
            .performers
            .iter_mut()
            .find(|p| p.id == foxtrot)
            .unwrap()
            .playlist_weight = 3;

        let plan = plan_rotation(&catalog, november(), 5).unwrap();
        let names: Vec<&str> = plan.picks.iter().map(|p| p.performer_name.as_str()).collect();
        assert_eq!(names, vec!["Foxtrot", "Alpha", "Bravo", "Charlie", "Delta"]);
        assert_eq!(plan.increment_count, 1);
        assert!(!plan.is_short());
    }

    #[test]
    fn test_duplicate_video_skips_performer() {
        let catalog = catalog_with(vec![
            performer("Alpha", "", vec![song("Split", "same", Some(5), None)]),
            performer("Beta", "", vec![song("Split", "same", Some(5), None)]),
        ]);
        let plan = plan_rotation(&catalog, november(), 5).unwrap();
        assert_eq!(plan.picks.len(), 1);
        assert_eq!(plan.skipped, vec!["Beta"]);
        assert!(plan.is_short());
        assert!(plan.describe().contains("Only 1 unique performers/songs found (expected 5)"));
    }

    #[test]
    fn test_errors() {
        let empty = catalog_with(vec![performer("Alpha", "", vec![song("Demo", "", None, None)])]);
        assert!(matches!(
            plan_rotation(&empty, november(), 5),
            Err(HakoakeError::NoEligiblePerformers { .. })
        ));
        assert!(matches!(
            plan_rotation(&empty, YearMonth::parse("2025-12").unwrap(), 5),
            Err(HakoakeError::NoEligiblePerformers { .. })
        ));

        let mut catalog = catalog_with(vec![performer("Alpha", "", vec![song("Hit", "v1", Some(1), None)])]);
        let plan = plan_rotation(&catalog, november(), 5).unwrap();
        commit_rotation(&mut catalog, &plan, None, "", now()).unwrap();
        assert!(matches!(
            plan_rotation(&catalog, november(), 5),
            Err(HakoakeError::PlaylistExists { .. })
        ));
        assert!(matches!(
            commit_rotation(&mut catalog, &plan, None, "", now()),
            Err(HakoakeError::PlaylistExists { .. })
        ));
    }

    #[test]
    fn test_commit_updates_weights_and_entries() {
        let mut catalog = catalog_with(vec![
            performer("Alpha", "", vec![song("Hit", "v1", Some(10), None)]),
            performer("Beta", "", vec![]),
        ]);
        let beta = catalog.performer_by_name("Beta").unwrap().id;

        let plan = plan_rotation(&catalog, november(), 5).unwrap();
        let id = commit_rotation(&mut catalog, &plan, Some("PL123"), "https://www.youtube.com/@hakkoakkei", now())
            .unwrap();

        let playlist = catalog.playlist(id).unwrap();
        assert_eq!(playlist.youtube_playlist_url, "https://www.youtube.com/playlist?list=PL123");
        let entries = catalog.entries_of(id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].position, 1);
        assert!(!entries[0].is_spotlight);

        assert_eq!(catalog.performer_by_name("Alpha").unwrap().playlist_weight, 0);
        assert_eq!(catalog.performer(beta).unwrap().playlist_weight, 1);
        assert_eq!(catalog.performer(beta).unwrap().playlist_weight_updated_at, now());
    }

    #[test]
    fn test_title_and_description() {
        let catalog = catalog_with(vec![performer("Alpha", "", vec![song("Hit", "v1", Some(10), None)])]);
        let plan = plan_rotation(&catalog, november(), 5).unwrap();

        assert_eq!(playlist_title(november(), "HAKKO-AKKEI"), "HAKKO-AKKEI November [TOKYO] (2025)");
        assert_eq!(
            playlist_description(&catalog, &plan),
            "Monthly playlist featuring top performers for November 2025.\n\n\
             Alpha 2025-11-03 (MON) @Shelter - https://shelter.example.jp"
        );
    }
}
