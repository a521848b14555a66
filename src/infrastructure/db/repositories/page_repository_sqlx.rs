use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;

use crate::application::ports::page_repository::PageRepository;
use crate::domain::pages::page::Page;
use crate::infrastructure::db::PgPool;

pub struct SqlxPageRepository {
    pub pool: PgPool,
}

impl SqlxPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn page_from_row(r: PgRow) -> Page {
    let fields: Json<BTreeMap<String, String>> = r.get("fields");
    Page {
        id: Some(r.get("id")),
        page_type: r.get("page_type"),
        title: r.get("title"),
        fields: fields.0,
        has_broken_link: r.get("has_broken_link"),
        has_broken_file: r.get("has_broken_file"),
        last_edited: r.get("last_edited"),
    }
}

#[async_trait]
impl PageRepository for SqlxPageRepository {
    async fn get_draft(&self, id: i64) -> anyhow::Result<Option<Page>> {
        let row = sqlx::query(
            r#"SELECT id, page_type, title, fields, has_broken_link, has_broken_file, last_edited
               FROM pages WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(page_from_row))
    }

    async fn find_body(&self, id: i64) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT fields->>'Content' AS body FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => {
                // pages without a Content field have an empty body
                let body: Option<String> = r.try_get("body")?;
                Ok(Some(body.unwrap_or_default()))
            }
            None => Ok(None),
        }
    }

    async fn insert_draft(&self, page: &Page) -> anyhow::Result<i64> {
        let row = sqlx::query(
            r#"INSERT INTO pages (page_type, title, fields, has_broken_link, has_broken_file, last_edited)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(&page.page_type)
        .bind(&page.title)
        .bind(Json(&page.fields))
        .bind(page.has_broken_link)
        .bind(page.has_broken_file)
        .bind(page.last_edited)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("id"))
    }

    async fn save_draft(&self, page: &Page) -> anyhow::Result<()> {
        let Some(id) = page.id else {
            anyhow::bail!("cannot save a page that was never inserted");
        };
        let res = sqlx::query(
            r#"UPDATE pages
               SET page_type = $2, title = $3, fields = $4,
                   has_broken_link = $5, has_broken_file = $6, last_edited = $7
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&page.page_type)
        .bind(&page.title)
        .bind(Json(&page.fields))
        .bind(page.has_broken_link)
        .bind(page.has_broken_file)
        .bind(page.last_edited)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            anyhow::bail!("page {id} does not exist");
        }
        Ok(())
    }

    async fn delete_draft(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_broken(&self) -> anyhow::Result<Vec<Page>> {
        let rows = sqlx::query(
            r#"SELECT id, page_type, title, fields, has_broken_link, has_broken_file, last_edited
               FROM pages
               WHERE has_broken_link OR has_broken_file
               ORDER BY title, id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(page_from_row).collect())
    }
}
