//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::deletion_request::DeletionRequest;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

/// Rows per INSERT statement; keeps bind parameters well under the protocol limit.
const BATCH_CHUNK_ROWS: usize = 1000;

#[derive(sqlx::FromRow)]
struct LinkRow {
    code: String,
    target: String,
    owner_id: i64,
    deleted: bool,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let owner_id = u64::try_from(row.owner_id).map_err(|_| {
            AppError::storage(format!("negative owner id {} for {}", row.owner_id, row.code))
        })?;
        Ok(Link {
            code: row.code,
            target: row.target,
            owner_id,
            deleted: row.deleted,
        })
    }
}

fn db_owner_id(owner_id: u64) -> Result<i64, AppError> {
    i64::try_from(owner_id)
        .map_err(|_| AppError::storage(format!("owner id {owner_id} does not fit in BIGINT")))
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Deduplication by target relies on the table's unique constraint and
/// `ON CONFLICT`, so concurrent creators of one target agree on its code.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get_or_create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let owner_id = db_owner_id(new_link.owner_id)?;

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, target, owner_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (target) DO UPDATE SET target = EXCLUDED.target
            RETURNING code, target, owner_id, deleted
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target)
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error(e, Some(&new_link.code)))?;

        row.try_into()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            "SELECT code, target, owner_id, deleted FROM links WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::try_from).transpose()
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM links WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn get_or_create_many(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        // A single INSERT ... ON CONFLICT may not touch the same row twice.
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(new_links.len());
        for new_link in new_links {
            if seen.insert(new_link.target.clone()) {
                rows.push((new_link.code, new_link.target, db_owner_id(new_link.owner_id)?));
            }
        }

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(rows.len());

        for chunk in rows.chunks(BATCH_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO links (code, target, owner_id) ");
            builder.push_values(chunk, |mut b, (code, target, owner_id)| {
                b.push_bind(code.clone())
                    .push_bind(target.clone())
                    .push_bind(*owner_id);
            });
            builder.push(
                " ON CONFLICT (target) DO UPDATE SET target = EXCLUDED.target \
                 RETURNING code, target, owner_id, deleted",
            );

            let chunk_rows: Vec<LinkRow> = builder
                .build_query_as()
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(e, None))?;
            stored.extend(chunk_rows);
        }

        tx.commit().await?;

        stored.into_iter().map(Link::try_from).collect()
    }

    async fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, target, owner_id, deleted
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at, code
            "#,
        )
        .bind(db_owner_id(owner_id)?)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(Link::try_from).collect()
    }

    async fn mark_deleted(&self, requests: Vec<DeletionRequest>) -> Result<(), AppError> {
        if requests.is_empty() {
            return Ok(());
        }

        let mut codes = Vec::with_capacity(requests.len());
        let mut owners = Vec::with_capacity(requests.len());
        for request in requests {
            owners.push(db_owner_id(request.owner_id)?);
            codes.push(request.code);
        }

        sqlx::query(
            r#"
            UPDATE links AS l
            SET deleted = TRUE
            FROM UNNEST($1::text[], $2::bigint[]) AS d(code, owner_id)
            WHERE l.code = d.code AND l.owner_id = d.owner_id AND NOT l.deleted
            "#,
        )
        .bind(codes)
        .bind(owners)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
