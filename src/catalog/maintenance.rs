// 收集狀態的維護：刪除某日之後的排程、清除上次收集紀錄

use crate::catalog::Catalog;
use crate::domain::model::{CollectionState, WebsiteProcessingState};
use crate::utils::error::{HakoakeError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// `reset_collection` 會刪掉的範圍
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReset {
    pub live_house_id: u64,
    pub live_house_name: String,
    pub from: NaiveDate,
    pub removed_schedules: usize,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub affected_performers: usize,
}

impl CollectionReset {
    pub fn describe(&self, dry_run: bool) -> String {
        let mut lines = vec![format!(
            "Resetting collection data for: {} (ID: {})\nTarget date: {}",
            self.live_house_name, self.live_house_id, self.from
        )];
        match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => {
                lines.push(format!("Found {} schedules to delete:", self.removed_schedules));
                lines.push(format!("  Date range: {} to {}", earliest, latest));
                lines.push(format!("  Unique performers affected: {}", self.affected_performers));
            }
            _ => lines.push("No schedules found to delete".to_string()),
        }
        lines.push(if dry_run {
            "Dry run: catalog not modified".to_string()
        } else {
            format!(
                "✅ Deleted {} schedules for {} from {} onwards and reset last collection",
                self.removed_schedules, self.live_house_name, self.from
            )
        });
        lines.join("\n")
    }
}

/// 清除前的收集狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearedCollection {
    pub live_house_id: u64,
    pub live_house_name: String,
    pub last_collected_at: Option<DateTime<Utc>>,
    pub last_collection_state: CollectionState,
}

impl ClearedCollection {
    pub fn describe(&self, dry_run: bool) -> String {
        let last = self
            .last_collected_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string());
        format!(
            "ID {}: {}\n  Current: Last collected {}, Status: {}\n  {}: last collected time and state",
            self.live_house_id,
            self.live_house_name,
            last,
            self.last_collection_state.as_str(),
            if dry_run { "Would clear" } else { "Cleared" }
        )
    }
}

impl Catalog {
    pub fn preview_reset(&self, live_house_id: u64, from: NaiveDate) -> Result<CollectionReset> {
        let house = self
            .live_house(live_house_id)
            .ok_or_else(|| HakoakeError::NotFound {
                entity: "LiveHouse",
                id: live_house_id.to_string(),
            })?;

        let doomed: Vec<_> = self
            .schedules
            .iter()
            .filter(|s| s.live_house_id == live_house_id && s.performance_date >= from)
            .collect();
        let performers: HashSet<u64> = doomed
            .iter()
            .flat_map(|s| s.performer_ids.iter().copied())
            .collect();

        Ok(CollectionReset {
            live_house_id,
            live_house_name: house.name.clone(),
            from,
            removed_schedules: doomed.len(),
            earliest: doomed.iter().map(|s| s.performance_date).min(),
            latest: doomed.iter().map(|s| s.performance_date).max(),
            affected_performers: performers.len(),
        })
    }

    /// 刪掉 `from` 當天起的排程，讓下次匯入重新收集這間 live house
    pub fn reset_collection(&mut self, live_house_id: u64, from: NaiveDate) -> Result<CollectionReset> {
        let reset = self.preview_reset(live_house_id, from)?;

        self.schedules
            .retain(|s| !(s.live_house_id == live_house_id && s.performance_date >= from));
        self.clear_state(live_house_id);

        tracing::info!(
            "🧹 Reset {}: removed {} schedules from {}",
            reset.live_house_name,
            reset.removed_schedules,
            from
        );
        Ok(reset)
    }

    /// 任何一個 id 不存在就整批拒絕
    pub fn preview_clear(&self, live_house_ids: &[u64]) -> Result<Vec<ClearedCollection>> {
        let mut missing: Vec<u64> = live_house_ids
            .iter()
            .copied()
            .filter(|id| self.live_house(*id).is_none())
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            missing.dedup();
            return Err(HakoakeError::NotFound {
                entity: "LiveHouse",
                id: missing
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let wanted: HashSet<u64> = live_house_ids.iter().copied().collect();
        let mut houses: Vec<_> = self
            .live_houses
            .iter()
            .filter(|h| wanted.contains(&h.id))
            .collect();
        houses.sort_by_key(|h| h.id);

        Ok(houses
            .into_iter()
            .map(|h| ClearedCollection {
                live_house_id: h.id,
                live_house_name: h.name.clone(),
                last_collected_at: h.last_collected_at,
                last_collection_state: h.last_collection_state,
            })
            .collect())
    }

    /// 回傳清除前的狀態
    pub fn clear_collection(&mut self, live_house_ids: &[u64]) -> Result<Vec<ClearedCollection>> {
        let cleared = self.preview_clear(live_house_ids)?;
        for entry in &cleared {
            self.clear_state(entry.live_house_id);
        }
        tracing::info!("🧹 Cleared collection data for {} live houses", cleared.len());
        Ok(cleared)
    }

    fn clear_state(&mut self, live_house_id: u64) {
        let Some(house) = self.live_houses.iter_mut().find(|h| h.id == live_house_id) else {
            return;
        };
        house.last_collected_at = None;
        house.last_collection_state = CollectionState::Pending;

        let website_id = house.website_id;
        if let Some(website) = self.websites.iter_mut().find(|w| w.id == website_id) {
            website.state = WebsiteProcessingState::NotStarted;
        }
    }
}
