use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::domain::links::link::{BacklinkInfo, TrackingEdge, TrackingRelation};
use crate::infrastructure::db::PgPool;

pub struct SqlxLinkTrackingRepository {
    pub pool: PgPool,
}

impl SqlxLinkTrackingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkTrackingRepository for SqlxLinkTrackingRepository {
    async fn list_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
    ) -> anyhow::Result<Vec<TrackingEdge>> {
        let sql = format!(
            "SELECT page_id, target_id, field_name FROM {} WHERE page_id = $1 ORDER BY field_name, target_id",
            relation.table_name()
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| TrackingEdge {
                owner_id: r.get("page_id"),
                target_id: r.get("target_id"),
                field_name: r.get("field_name"),
            })
            .collect())
    }

    async fn replace_field_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
        field_name: &str,
        targets: &[i64],
    ) -> anyhow::Result<()> {
        let table = relation.table_name();
        let delete_sql = format!("DELETE FROM {table} WHERE page_id = $1 AND field_name = $2");
        let insert_sql = format!(
            r#"INSERT INTO {table} (page_id, target_id, field_name)
               SELECT $1, t, $2 FROM UNNEST($3::BIGINT[]) AS t
               ON CONFLICT DO NOTHING"#
        );
        let mut tx = self.pool.begin().await?;
        sqlx::query(&delete_sql)
            .bind(owner_id)
            .bind(field_name)
            .execute(&mut *tx)
            .await?;
        if !targets.is_empty() {
            sqlx::query(&insert_sql)
                .bind(owner_id)
                .bind(field_name)
                .bind(targets)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_owner(&self, owner_id: i64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for relation in TrackingRelation::ALL {
            let sql = format!("DELETE FROM {} WHERE page_id = $1", relation.table_name());
            sqlx::query(&sql).bind(owner_id).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn owners_linking_to(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<i64>> {
        let sql = format!(
            "SELECT DISTINCT page_id FROM {} WHERE target_id = $1 ORDER BY page_id",
            relation.table_name()
        );
        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(target_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn backlinks_for(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<BacklinkInfo>> {
        let sql = format!(
            r#"SELECT p.id AS page_id, p.title,
                      ARRAY_AGG(DISTINCT t.field_name ORDER BY t.field_name) AS field_names
               FROM {} t
               JOIN pages p ON p.id = t.page_id
               WHERE t.target_id = $1
               GROUP BY p.id, p.title
               ORDER BY p.title, p.id"#,
            relation.table_name()
        );
        let rows = sqlx::query(&sql)
            .bind(target_id)
            .fetch_all(&self.pool)
            .await?;
        let backlinks = rows
            .into_iter()
            .map(|r| {
                Ok(BacklinkInfo {
                    page_id: r.try_get("page_id")?,
                    title: r.try_get("title")?,
                    field_names: r.try_get("field_names")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(backlinks)
    }
}
