use async_trait::async_trait;

use crate::domain::pages::page::Page;

/// Draft (working) copies of site tree pages.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn get_draft(&self, id: i64) -> anyhow::Result<Option<Page>>;

    /// Body text used to validate `#anchor` suffixes on links pointing at this page.
    /// `None` when the page does not exist.
    async fn find_body(&self, id: i64) -> anyhow::Result<Option<String>>;

    // Returns the assigned id; the page's own `id` is ignored
    async fn insert_draft(&self, page: &Page) -> anyhow::Result<i64>;

    async fn save_draft(&self, page: &Page) -> anyhow::Result<()>;

    // Returns false if nothing was deleted
    async fn delete_draft(&self, id: i64) -> anyhow::Result<bool>;

    /// Pages carrying either broken flag, ordered by title.
    async fn list_broken(&self) -> anyhow::Result<Vec<Page>>;
}
