use crate::catalog::{Catalog, CatalogStore};
use crate::collection::{draft_schedule, feed::split_feed, names};
use crate::core::{ConfigProvider, Pipeline, Record, Storage};
use crate::domain::draft::{ImportBatch, Rejection};
use crate::domain::model::CollectionState;
use crate::utils::error::{HakoakeError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 收集結果摘要，寫入 collection-summary.json
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub collected_at: DateTime<Utc>,
    pub records: usize,
    pub imported_schedules: usize,
    pub new_performers: usize,
    pub skipped_venues: Vec<String>,
    pub websites_by_state: BTreeMap<String, usize>,
    pub live_houses: usize,
    pub schedules: usize,
    pub performers: usize,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    date: String,
    open_time: String,
    start_time: String,
    venue: &'a str,
    performance_name: &'a str,
    performers: String,
    presale_price: Option<u32>,
    door_price: Option<u32>,
    ticket_url: &'a str,
}

pub struct ImportPipeline<S: Storage, C: ConfigProvider> {
    store: CatalogStore<S>,
    config: C,
    client: Client,
    force: bool,
    now: Option<DateTime<Utc>>,
}

impl<S: Storage, C: ConfigProvider> ImportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let catalog_file = config.catalog_file().to_string();
        Self {
            store: CatalogStore::new(storage, catalog_file),
            config,
            client: Client::new(),
            force: false,
            now: None,
        }
    }

    /// 忽略「今天已收集」的略過規則
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// 固定匯入時間，用於測試
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn websites_by_state(catalog: &Catalog) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for website in catalog.websites() {
            *counts.entry(website.state.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    fn schedules_csv(catalog: &Catalog) -> Result<Vec<u8>> {
        let mut schedules: Vec<_> = catalog.schedules().iter().collect();
        schedules.sort_by_key(|s| (s.performance_date, s.start_time, s.id));

        let mut buffer = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            for schedule in schedules {
                let venue = catalog
                    .live_house(schedule.live_house_id)
                    .map(|h| h.name.as_str())
                    .unwrap_or("");
                let performers: Vec<&str> = schedule
                    .performer_ids
                    .iter()
                    .filter_map(|id| catalog.performer(*id))
                    .map(|p| p.name.as_str())
                    .collect();
                writer.serialize(ScheduleRow {
                    date: schedule.performance_date.format("%Y-%m-%d").to_string(),
                    open_time: schedule
                        .open_time
                        .map(|t| t.format("%H:%M").to_string())
                        .unwrap_or_default(),
                    start_time: schedule.start_time.format("%H:%M").to_string(),
                    venue,
                    performance_name: &schedule.performance_name,
                    performers: performers.join(" / "),
                    presale_price: schedule.presale_price,
                    door_price: schedule.door_price,
                    ticket_url: schedule
                        .ticket
                        .as_ref()
                        .and_then(|t| t.url.as_deref())
                        .unwrap_or(""),
                })?;
            }
            writer.flush()?;
        }
        Ok(buffer)
    }

    fn build_dump(catalog: &Catalog, summary: &CollectionSummary) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>("catalog.json", FileOptions::default())?;
        zip.write_all(&serde_json::to_vec_pretty(catalog)?)?;

        zip.start_file::<_, ()>("collection-summary.json", FileOptions::default())?;
        zip.write_all(&serde_json::to_vec_pretty(summary)?)?;

        zip.start_file::<_, ()>("schedules.csv", FileOptions::default())?;
        zip.write_all(&Self::schedules_csv(catalog)?)?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ImportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let endpoint = self.config.feed_endpoint();
        tracing::debug!("Requesting schedule feed: {}", endpoint);

        let mut request = self
            .client
            .get(endpoint)
            .timeout(self.config.request_timeout());
        for (key, value) in self.config.feed_headers() {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Feed response status: {}", status);

        if !status.is_success() {
            return Err(HakoakeError::FeedStatusError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(split_feed(body))
    }

    async fn transform(&self, data: Vec<Record>) -> Result<ImportBatch> {
        let mut batch = ImportBatch {
            record_count: data.len(),
            ..Default::default()
        };

        for (index, record) in data.iter().enumerate() {
            match draft_schedule(index, record, self.config.max_capacity()) {
                Ok(draft) => batch.schedules.push(draft),
                Err(e) => batch.reject(index, e.to_string()),
            }
        }

        Ok(batch)
    }

    async fn load(&self, batch: ImportBatch) -> Result<String> {
        let now = self.now();
        let today = now.date_naive();
        let mut catalog = self.store.load().await?;
        let mut rejections = batch.rejections.clone();

        // 略過名單在寫入任何資料前決定
        let skip_enabled = self.config.skip_collected_today() && !self.force;
        let already_collected: HashSet<String> = if skip_enabled {
            batch
                .schedules
                .iter()
                .map(|s| s.venue.website.clone())
                .filter(|url| catalog.collected_successfully_on(url, today))
                .collect()
        } else {
            HashSet::new()
        };
        for url in &already_collected {
            tracing::info!("⏭️ {} already collected today, skipping", url);
        }

        let mut touched_houses = BTreeSet::new();
        let mut imported_schedules = 0;
        let mut new_performers = 0;

        for draft in &batch.schedules {
            if already_collected.contains(&draft.venue.website) {
                continue;
            }

            let mut performer_ids = Vec::new();
            for performer in &draft.performers {
                if self.config.require_online_presence()
                    && !catalog.knows_performer(performer)
                    && !names::has_online_presence(performer)
                {
                    tracing::warn!(
                        "❌ Skipping '{}' for {} on {}: no online presence",
                        performer.name,
                        draft.venue.name,
                        draft.date
                    );
                    continue;
                }

                let (id, created) = catalog.find_or_create_performer(performer, now);
                if created {
                    new_performers += 1;
                    tracing::info!("✅ Created performer: {}", performer.name);
                }
                for song in &performer.songs {
                    catalog.upsert_song(id, song);
                }
                performer_ids.push(id);
            }

            if performer_ids.is_empty() {
                let reason = format!(
                    "no valid performers for {} on {}",
                    draft.venue.name, draft.date
                );
                tracing::warn!("⚠️ Skipping schedule: {}", reason);
                rejections.push(Rejection {
                    index: draft.source_index,
                    reason,
                });
                continue;
            }

            let website_id = catalog.upsert_website(&draft.venue.website);
            let house_id = catalog.upsert_live_house(website_id, &draft.venue);
            catalog.upsert_schedule(house_id, draft, &performer_ids);
            touched_houses.insert(house_id);
            imported_schedules += 1;
        }

        for house_id in &touched_houses {
            catalog.record_collection(*house_id, CollectionState::Success, now);
        }

        self.store.save(&catalog).await?;
        tracing::info!(
            "📊 Imported {} schedules across {} live houses ({} new performers)",
            imported_schedules,
            touched_houses.len(),
            new_performers
        );

        let catalog_path = format!("{}/{}", self.config.catalog_path(), self.store.file());
        if !self.config.dump_enabled() {
            return Ok(catalog_path);
        }

        let mut skipped_venues: Vec<String> = already_collected.into_iter().collect();
        skipped_venues.sort();
        let summary = CollectionSummary {
            collected_at: now,
            records: batch.record_count,
            imported_schedules,
            new_performers,
            skipped_venues,
            websites_by_state: Self::websites_by_state(&catalog),
            live_houses: catalog.live_houses().len(),
            schedules: catalog.schedules().len(),
            performers: catalog.performers().len(),
            rejections,
        };

        let dump_name = format!("collected-{}.zip", now.format("%Y%m%d_%H%M"));
        let zip_data = Self::build_dump(&catalog, &summary)?;
        tracing::debug!("Writing collection dump ({} bytes)", zip_data.len());
        self.store.storage().write_file(&dump_name, &zip_data).await?;

        Ok(format!("{}/{}", self.config.catalog_path(), dump_name))
    }
}
