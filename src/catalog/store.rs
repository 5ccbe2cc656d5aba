use crate::catalog::Catalog;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// 透過 Storage 讀寫目錄 JSON
pub struct CatalogStore<S: Storage> {
    storage: S,
    file: String,
}

impl<S: Storage> CatalogStore<S> {
    pub fn new(storage: S, file: impl Into<String>) -> Self {
        Self {
            storage,
            file: file.into(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 檔案不存在時回傳空目錄
    pub async fn load(&self) -> Result<Catalog> {
        if !self.storage.exists(&self.file).await? {
            tracing::info!("📁 Catalog {} not found, starting empty", self.file);
            return Ok(Catalog::new());
        }

        let bytes = self.storage.read_file(&self.file).await?;
        let catalog: Catalog = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            "Loaded catalog: {} live houses, {} performers, {} schedules, {} playlists",
            catalog.live_houses.len(),
            catalog.performers.len(),
            catalog.schedules.len(),
            catalog.playlists.len()
        );
        Ok(catalog)
    }

    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_vec_pretty(catalog)?;
        tracing::debug!("Writing catalog ({} bytes) to {}", json.len(), self.file);
        self.storage.write_file(&self.file, &json).await
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockStorage;
    use super::*;
    use crate::catalog::fixtures::*;
    use crate::domain::ports::Storage;

    #[tokio::test]
    async fn test_load_missing_file_returns_empty_catalog() {
        let store = CatalogStore::new(MockStorage::new(), "catalog.json");
        let catalog = store.load().await.unwrap();
        assert!(catalog.performers().is_empty());
        assert!(catalog.playlists().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_id_sequences() {
        let storage = MockStorage::new();
        let store = CatalogStore::new(storage.clone(), "catalog.json");

        let mut catalog = Catalog::new();
        add_schedule(
            &mut catalog,
            &schedule(
                venue("Shelter", "https://shelter.example.jp"),
                "2025-11-03",
                vec![performer("Alpha", "", vec![])],
            ),
        );
        store.save(&catalog).await.unwrap();
        assert!(storage.get_file("catalog.json").await.is_some());

        let mut reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.performers().len(), 1);

        let (id, created) = reloaded.find_or_create_performer(&performer("Beta", "", vec![]), now());
        assert!(created);
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let storage = MockStorage::new();
        storage.write_file("catalog.json", b"{not json").await.unwrap();
        let store = CatalogStore::new(storage, "catalog.json");
        assert!(store.load().await.is_err());
    }
}
