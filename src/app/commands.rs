use crate::catalog::CatalogStore;
use crate::config::cli::LocalStorage;
use crate::config::toml_config::AppConfig;
use crate::config::{
    CollectionCommand, Command, ListingFormat, NarrationCommand, PlaylistCommand, StatusFormat,
};
use crate::core::{EtlEngine, ImportPipeline};
use crate::domain::month::YearMonth;
use crate::narration::{build_prompt, lint};
use crate::playlist::{
    add_spotlight, commit_rotation, fix_positions, plan_rotation, playlist_description,
    playlist_title,
};
use crate::report::{monthly_performers, status};
use crate::utils::error::Result;
use chrono::{Local, Utc};

/// 稿子未通過檢查時的結束碼
pub const LINT_FAILED_EXIT_CODE: i32 = 2;

/// 指令輸出與結束碼
#[derive(Debug, Default)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code: 0,
        }
    }
}

fn catalog_store(config: &AppConfig) -> CatalogStore<LocalStorage> {
    CatalogStore::new(LocalStorage::new(&config.catalog.path), &config.catalog.file)
}

fn this_month() -> YearMonth {
    YearMonth::of(Local::now().date_naive())
}

/// 執行子指令，輸出交給呼叫端印出
pub async fn execute(command: &Command, config: &AppConfig, monitor: bool) -> Result<Outcome> {
    match command {
        Command::Import { dry_run, force } => import(config, *dry_run, *force, monitor).await,
        Command::Status { months, format } => {
            let catalog = catalog_store(config).load().await?;
            let report = status(&catalog, this_month(), *months, Utc::now());
            let output = match format {
                StatusFormat::Text => report.to_text(),
                StatusFormat::Json => report.to_json()?,
            };
            Ok(Outcome::ok(output))
        }
        Command::Performers {
            month,
            upcoming_only,
            format,
        } => {
            let catalog = catalog_store(config).load().await?;
            let month = month.unwrap_or_else(this_month);
            let listing = monthly_performers(&catalog, month, *upcoming_only, Local::now().date_naive());
            let output = match format {
                ListingFormat::Text => listing.to_text(),
                ListingFormat::Csv => listing.to_csv()?,
            };
            Ok(Outcome::ok(output))
        }
        Command::Playlist(command) => playlist(command, config).await,
        Command::Narration(command) => narration(command, config).await,
        Command::Collection(command) => collection(command, config).await,
    }
}

async fn import(config: &AppConfig, dry_run: bool, force: bool, monitor: bool) -> Result<Outcome> {
    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(Outcome::ok(format!("{}\nDry run: nothing imported", config.summary())));
    }

    config.require_feed_endpoint()?;
    let pipeline = ImportPipeline::new(LocalStorage::new(&config.catalog.path), config.clone())
        .with_force(force);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor || config.monitoring_enabled());

    let output_path = engine.run().await?;
    Ok(Outcome::ok(format!(
        "✅ Import completed successfully!\n📁 Output saved to: {}",
        output_path
    )))
}

async fn playlist(command: &PlaylistCommand, config: &AppConfig) -> Result<Outcome> {
    let store = catalog_store(config);
    let mut catalog = store.load().await?;

    match command {
        PlaylistCommand::Create {
            month,
            dry_run,
            youtube_playlist_id,
        } => {
            let plan = plan_rotation(&catalog, *month, config.playlist.size)?;
            let mut lines = vec![
                format!("Title: {}", playlist_title(*month, &config.playlist.title_prefix)),
                String::new(),
                playlist_description(&catalog, &plan),
                String::new(),
                plan.describe(),
            ];

            if *dry_run {
                lines.push("Dry run: catalog not modified".to_string());
                return Ok(Outcome::ok(lines.join("\n")));
            }

            let id = commit_rotation(
                &mut catalog,
                &plan,
                youtube_playlist_id.as_deref(),
                &config.playlist.channel_url,
                Utc::now(),
            )?;
            store.save(&catalog).await?;

            lines.push(format!("✅ Created playlist {} for {}", id, month));
            if let Some(created) = catalog.playlist(id) {
                if !created.youtube_playlist_url.is_empty() {
                    lines.push(format!("🔗 {}", created.youtube_playlist_url));
                }
            }
            Ok(Outcome::ok(lines.join("\n")))
        }
        PlaylistCommand::Spotlight {
            playlist_id,
            performer_id,
            max_minutes,
        } => {
            let minutes = max_minutes.unwrap_or(config.playlist.max_spotlight_duration_minutes);
            let entry = add_spotlight(&mut catalog, *playlist_id, *performer_id, minutes)?;
            store.save(&catalog).await?;

            Ok(Outcome::ok(format!(
                "✅ Added spotlight entry at position {}\n  Performer: {} (other playlist appearances: {})\n  Song: {} ({} views)\n  {}",
                entry.position,
                entry.performer_name,
                entry.other_appearances,
                entry.song_title,
                entry.view_count,
                entry.youtube_url
            )))
        }
        PlaylistCommand::FixPositions {
            playlist_id,
            dry_run,
        } => {
            let fixes = fix_positions(&mut catalog, *playlist_id, *dry_run)?;
            let changed: usize = fixes.iter().map(|f| f.changes.len()).sum();
            if !*dry_run && changed > 0 {
                store.save(&catalog).await?;
            }

            let mut lines: Vec<String> = fixes.iter().map(|f| f.describe()).collect();
            if fixes.is_empty() {
                lines.push("No playlists found".to_string());
            }
            lines.push(format!(
                "{} {} entries",
                if *dry_run { "Would fix" } else { "Fixed" },
                changed
            ));
            Ok(Outcome::ok(lines.join("\n")))
        }
    }
}

async fn collection(command: &CollectionCommand, config: &AppConfig) -> Result<Outcome> {
    let store = catalog_store(config);
    let mut catalog = store.load().await?;

    match command {
        CollectionCommand::Reset {
            live_house_id,
            from,
            dry_run,
        } => {
            let reset = if *dry_run {
                catalog.preview_reset(*live_house_id, *from)?
            } else {
                let reset = catalog.reset_collection(*live_house_id, *from)?;
                store.save(&catalog).await?;
                reset
            };
            Ok(Outcome::ok(reset.describe(*dry_run)))
        }
        CollectionCommand::Clear {
            live_house_ids,
            dry_run,
        } => {
            let cleared = if *dry_run {
                catalog.preview_clear(live_house_ids)?
            } else {
                let cleared = catalog.clear_collection(live_house_ids)?;
                store.save(&catalog).await?;
                cleared
            };

            let mut lines = vec![format!("Processing {} live houses:", cleared.len())];
            lines.extend(cleared.iter().map(|c| c.describe(*dry_run)));
            lines.push(if *dry_run {
                "Dry run: catalog not modified".to_string()
            } else {
                format!("✅ Cleared collection data for {} live houses", cleared.len())
            });
            Ok(Outcome::ok(lines.join("\n")))
        }
    }
}

async fn narration(command: &NarrationCommand, config: &AppConfig) -> Result<Outcome> {
    match command {
        NarrationCommand::Prompt {
            playlist_id,
            variant,
            output,
        } => {
            let catalog = catalog_store(config).load().await?;
            let options = config.prompt_options(*variant)?;
            let request = build_prompt(&catalog, *playlist_id, &options)?;
            let json = serde_json::to_string_pretty(&request)?;

            match output {
                Some(path) => {
                    tokio::fs::write(path, &json).await?;
                    Ok(Outcome::ok(format!("📝 Prompt written to {}", path)))
                }
                None => Ok(Outcome::ok(json)),
            }
        }
        NarrationCommand::Lint {
            script,
            variant,
            performers,
        } => {
            let text = tokio::fs::read_to_string(script).await?;
            let variant = variant.unwrap_or(config.narration.variant);
            let report = lint(&text, variant, *performers, &config.narration.rules);

            Ok(Outcome {
                output: report.describe(),
                exit_code: if report.is_clean() { 0 } else { LINT_FAILED_EXIT_CODE },
            })
        }
    }
}
