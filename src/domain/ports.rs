use crate::domain::draft::ImportBatch;
use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn feed_endpoint(&self) -> &str;
    fn feed_headers(&self) -> &HashMap<String, String>;
    fn catalog_path(&self) -> &str;
    fn catalog_file(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn max_capacity(&self) -> u32;
    fn skip_collected_today(&self) -> bool;
    fn require_online_presence(&self) -> bool;
    fn dump_enabled(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<ImportBatch>;
    async fn load(&self, batch: ImportBatch) -> Result<String>;
}
