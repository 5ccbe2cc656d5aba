use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting schedule import");
        self.monitor.log_phase("start");

        // Extract
        tracing::info!("📡 Extracting schedule feed...");
        let records = self.pipeline.extract().await?;
        tracing::info!("✅ Extracted {} records", records.len());
        self.monitor.log_phase("extract");

        // Transform
        tracing::info!("🔄 Transforming records...");
        let batch = self.pipeline.transform(records).await?;
        tracing::info!(
            "✅ Prepared {} schedules, rejected {} records",
            batch.schedules.len(),
            batch.rejections.len()
        );
        self.monitor.log_phase("transform");

        // Load
        tracing::info!("💾 Loading into catalog...");
        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("✅ Output saved to: {}", output_path);
        self.monitor.log_phase("load");

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::ImportBatch;
    use crate::domain::model::Record;
    use crate::utils::error::HakoakeError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        loaded: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<Vec<Record>> {
            if self.fail_extract {
                return Err(HakoakeError::FeedStatusError {
                    endpoint: "http://feed".to_string(),
                    status: 503,
                });
            }
            Ok(vec![Record { data: HashMap::new() }, Record { data: HashMap::new() }])
        }

        async fn transform(&self, data: Vec<Record>) -> Result<ImportBatch> {
            let mut batch = ImportBatch {
                record_count: data.len(),
                ..Default::default()
            };
            batch.reject(1, "test");
            Ok(batch)
        }

        async fn load(&self, batch: ImportBatch) -> Result<String> {
            self.loaded.store(batch.record_count, Ordering::SeqCst);
            Ok("out/catalog.json".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_passes_batch_through_phases() {
        let engine = EtlEngine::new(CountingPipeline::default());
        let path = engine.run().await.unwrap();
        assert_eq!(path, "out/catalog.json");
        assert_eq!(engine.pipeline().loaded.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_extract_failure() {
        let engine = EtlEngine::new_with_monitoring(
            CountingPipeline {
                fail_extract: true,
                ..Default::default()
            },
            true,
        );
        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline().loaded.load(Ordering::SeqCst), 0);
    }
}
