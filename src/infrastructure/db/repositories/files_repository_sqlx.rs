use async_trait::async_trait;

use crate::application::ports::files_repository::FilesRepository;
use crate::infrastructure::db::PgPool;

pub struct SqlxFilesRepository {
    pub pool: PgPool,
}

impl SqlxFilesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FilesRepository for SqlxFilesRepository {
    async fn file_exists(&self, file_id: i64) -> anyhow::Result<bool> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n > 0)
    }
}
