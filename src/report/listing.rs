use crate::catalog::Catalog;
use crate::domain::month::YearMonth;
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformerRow {
    pub performer_id: u64,
    pub performer_name: String,
    pub venue: String,
    pub performance_date: NaiveDate,
    pub presale_price: Option<u32>,
    pub door_price: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct MonthlyListing {
    pub month: YearMonth,
    pub upcoming_only: bool,
    pub rows: Vec<PerformerRow>,
}

/// 當月每場演出、每位表演者一列，依日期與開演時間排序
pub fn monthly_performers(
    catalog: &Catalog,
    month: YearMonth,
    upcoming_only: bool,
    today: NaiveDate,
) -> MonthlyListing {
    let rows = catalog
        .performances_in(month)
        .into_iter()
        .filter(|s| !upcoming_only || s.performance_date >= today)
        .flat_map(|schedule| {
            let venue = catalog
                .live_house(schedule.live_house_id)
                .map(|h| h.name.clone())
                .unwrap_or_default();
            schedule
                .performer_ids
                .iter()
                .filter_map(|id| catalog.performer(*id))
                .map(move |performer| PerformerRow {
                    performer_id: performer.id,
                    performer_name: performer.name.clone(),
                    venue: venue.clone(),
                    performance_date: schedule.performance_date,
                    presale_price: schedule.presale_price,
                    door_price: schedule.door_price,
                })
        })
        .collect();

    MonthlyListing {
        month,
        upcoming_only,
        rows,
    }
}

/// ¥2,500 形式，沒有價格時為 "-"
pub fn format_yen(price: Option<u32>) -> String {
    let Some(price) = price.filter(|p| *p > 0) else {
        return "-".to_string();
    };
    let digits = price.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("¥{}", grouped)
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

impl MonthlyListing {
    pub fn unique_performers(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.performer_id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return format!("No performances found for {}.", self.month);
        }

        let mut lines = vec![format!(
            "Performers scheduled for {}{}",
            self.month.long_name(),
            if self.upcoming_only { " (upcoming only)" } else { "" }
        )];
        lines.push(String::new());
        lines.push(format!(
            "{:<15} {:<30} {:<30} {:<18} {:<10} {:<10}",
            "Performer ID", "Performer Name", "Venue", "Performance Date", "Presale", "Door"
        ));
        lines.push("-".repeat(118));
        for row in &self.rows {
            lines.push(format!(
                "{:<15} {:<30} {:<30} {:<18} {:<10} {:<10}",
                row.performer_id,
                truncate(&row.performer_name, 28),
                truncate(&row.venue, 28),
                row.performance_date.to_string(),
                format_yen(row.presale_price),
                format_yen(row.door_price)
            ));
        }
        lines.push("-".repeat(118));
        lines.push(format!("Total unique performers: {}", self.unique_performers()));
        lines.push(format!("Total performances listed: {}", self.rows.len()));
        lines.join("\n")
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
