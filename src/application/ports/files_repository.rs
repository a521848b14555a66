use async_trait::async_trait;

#[async_trait]
pub trait FilesRepository: Send + Sync {
    async fn file_exists(&self, file_id: i64) -> anyhow::Result<bool>;
}
