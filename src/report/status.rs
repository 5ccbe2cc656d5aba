use crate::catalog::Catalog;
use crate::domain::month::YearMonth;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthCounts {
    pub performances: usize,
    pub performers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueStatus {
    pub name: String,
    pub capacity: u32,
    pub website: String,
    pub last_collected: Option<DateTime<Utc>>,
    pub status: String,
    /// "YYYY-MM" → 當月統計
    pub months: BTreeMap<String, MonthCounts>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusTotals {
    pub performances: usize,
    pub performers: usize,
    pub venues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub total: StatusTotals,
    pub venues: Vec<VenueStatus>,
    #[serde(skip)]
    months: Vec<YearMonth>,
    #[serde(skip)]
    generated_at: DateTime<Utc>,
}

/// 各場地的收集狀態與每月演出數，從 `from` 開始共 `months` 個月
pub fn status(catalog: &Catalog, from: YearMonth, months: usize, now: DateTime<Utc>) -> StatusReport {
    let months: Vec<YearMonth> = from.iter_from(months).collect();

    let mut houses: Vec<_> = catalog.live_houses().iter().collect();
    houses.sort_by(|a, b| a.name.cmp(&b.name));

    let venues = houses
        .into_iter()
        .map(|house| {
            let counts = months
                .iter()
                .map(|month| {
                    let schedules: Vec<_> = catalog
                        .performances_in(*month)
                        .into_iter()
                        .filter(|s| s.live_house_id == house.id)
                        .collect();
                    let performers: HashSet<u64> = schedules
                        .iter()
                        .flat_map(|s| s.performer_ids.iter().copied())
                        .collect();
                    (
                        month.to_string(),
                        MonthCounts {
                            performances: schedules.len(),
                            performers: performers.len(),
                        },
                    )
                })
                .collect();

            VenueStatus {
                name: house.name.clone(),
                capacity: house.capacity,
                website: catalog.venue_url(house.id).to_string(),
                last_collected: house.last_collected_at,
                status: house.last_collection_state.as_str().to_string(),
                months: counts,
            }
        })
        .collect::<Vec<_>>();

    let performing: HashSet<u64> = catalog
        .schedules()
        .iter()
        .flat_map(|s| s.performer_ids.iter().copied())
        .collect();

    StatusReport {
        total: StatusTotals {
            performances: catalog.schedules().len(),
            performers: performing.len(),
            venues: venues.len(),
        },
        venues,
        months,
        generated_at: now,
    }
}

fn plural(count: i64, unit: &str) -> String {
    format!("{} {}{} ago", count, unit, if count == 1 { "" } else { "s" })
}

fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - at;
    if delta.num_days() > 0 {
        plural(delta.num_days(), "day")
    } else if delta.num_hours() > 0 {
        plural(delta.num_hours(), "hour")
    } else if delta.num_minutes() > 0 {
        plural(delta.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

impl StatusReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            "PERFORMANCE COLLECTION STATUS".to_string(),
            rule.clone(),
            format!("Total Performances: {}", self.total.performances),
            format!("Total Unique Performers: {}", self.total.performers),
            format!("Total Venues: {}", self.total.venues),
        ];

        if self.venues.is_empty() {
            lines.push(String::new());
            lines.push("No live houses found.".to_string());
        }

        for venue in &self.venues {
            lines.push(String::new());
            lines.push(format!("{} (capacity {})", venue.name, venue.capacity));
            lines.push("-".repeat(RULE_WIDTH));
            match venue.last_collected {
                Some(at) => lines.push(format!(
                    "Last Collected: {} ({})",
                    at.format("%Y-%m-%d %H:%M:%S"),
                    time_ago(at, self.generated_at)
                )),
                None => lines.push("Last Collected: Never".to_string()),
            }
            lines.push(format!("Status: {}", venue.status));
            lines.push(format!("Website: {}", venue.website));

            for month in &self.months {
                let counts = venue.months.get(&month.to_string()).copied().unwrap_or_default();
                if counts.performances == 0 {
                    lines.push(format!("  {:20} No performances", month.long_name()));
                } else {
                    lines.push(format!(
                        "  {:20} {:3} performances, {:3} performers",
                        month.long_name(),
                        counts.performances,
                        counts.performers
                    ));
                }
            }
        }

        lines.push(rule);
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::*;
    use crate::domain::model::CollectionState;
    use chrono::Duration;

    #[test]
    fn test_status_counts_by_venue_and_month() {
        let mut catalog = Catalog::new();
        let shelter = venue("Shelter", "https://shelter.example.jp");
        add_schedule(
            &mut catalog,
            &schedule(
                shelter.clone(),
                "2025-11-03",
                vec![performer("Alpha", "", vec![]), performer("Beta", "", vec![])],
            ),
        );
        let id = add_schedule(
            &mut catalog,
            &schedule(shelter, "2025-11-10", vec![performer("Alpha", "", vec![])]),
        );
        add_schedule(
            &mut catalog,
            &schedule(
                venue("Antiknock", "https://antiknock.example.jp"),
                "2025-12-01",
                vec![performer("Gamma", "", vec![])],
            ),
        );
        let house_id = catalog.schedule(id).unwrap().live_house_id;
        catalog.record_collection(house_id, CollectionState::Success, now() - Duration::hours(3));

        let report = status(&catalog, YearMonth::parse("2025-11").unwrap(), 2, now());
        assert_eq!(report.total.performances, 3);
        assert_eq!(report.total.performers, 3);
        assert_eq!(report.venues[0].name, "Antiknock");

        let shelter = &report.venues[1];
        assert_eq!(shelter.status, "success");
        assert_eq!(
            shelter.months["2025-11"],
            MonthCounts {
                performances: 2,
                performers: 2
            }
        );
        assert_eq!(shelter.months["2025-12"], MonthCounts::default());

        let text = report.to_text();
        assert!(text.contains("(3 hours ago)"));
        assert!(text.contains("Last Collected: Never"));
        assert!(text.contains("December 2025        No performances"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["total"]["venues"], 2);
        assert_eq!(json["venues"][1]["months"]["2025-11"]["performances"], 2);
    }

    #[test]
    fn test_time_ago() {
        assert_eq!(time_ago(now() - Duration::days(1), now()), "1 day ago");
        assert_eq!(time_ago(now() - Duration::minutes(5), now()), "5 minutes ago");
        assert_eq!(time_ago(now(), now()), "just now");
    }
}
