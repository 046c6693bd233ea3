use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Parking, ParkingDraft, ParkingFilter, SortKey};
use crate::error::AppError;

/// Persistence for parking records.
#[async_trait]
pub trait ParkingStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Parking>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Parking>, AppError>;
    async fn search(&self, filter: &ParkingFilter, sort: SortKey) -> Result<Vec<Parking>, AppError>;
    async fn insert(&self, draft: ParkingDraft) -> Result<Parking, AppError>;
    /// Returns `None` when no parking has this id; nothing is written in that case.
    async fn update(&self, id: Uuid, draft: ParkingDraft) -> Result<Option<Parking>, AppError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgParkingStore {
    db: PgPool,
}

impl PgParkingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str = "id, name, city, address, latitude, longitude, rating, map_url";

#[async_trait]
impl ParkingStore for PgParkingStore {
    async fn find_all(&self) -> Result<Vec<Parking>, AppError> {
        let rows = sqlx::query_as::<_, Parking>(&format!(
            "SELECT {COLUMNS} FROM parkings ORDER BY name ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list parkings")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Parking>, AppError> {
        let row = sqlx::query_as::<_, Parking>(&format!(
            "SELECT {COLUMNS} FROM parkings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get parking by id")?;
        Ok(row)
    }

    async fn search(&self, filter: &ParkingFilter, sort: SortKey) -> Result<Vec<Parking>, AppError> {
        let order = match sort {
            SortKey::Name => "name ASC",
            SortKey::Rating => "rating DESC",
        };
        // NULL binds switch a predicate off; strpos keeps % and _ literal
        let sql = format!(
            r#"
            SELECT {COLUMNS}
              FROM parkings
             WHERE ($1::text IS NULL OR strpos(lower(city), lower($1)) > 0)
               AND ($2::text IS NULL OR strpos(lower(address), lower($2)) > 0)
             ORDER BY {order}
            "#
        );
        let rows = sqlx::query_as::<_, Parking>(&sql)
            .bind(filter.city())
            .bind(filter.address())
            .fetch_all(&self.db)
            .await
            .context("search parkings")?;
        Ok(rows)
    }

    async fn insert(&self, draft: ParkingDraft) -> Result<Parking, AppError> {
        let row = sqlx::query_as::<_, Parking>(&format!(
            r#"
            INSERT INTO parkings (name, city, address, latitude, longitude, rating, map_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(draft.name)
        .bind(draft.city)
        .bind(draft.address)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.rating)
        .bind(draft.map_url)
        .fetch_one(&self.db)
        .await
        .context("insert parking")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, draft: ParkingDraft) -> Result<Option<Parking>, AppError> {
        let row = sqlx::query_as::<_, Parking>(&format!(
            r#"
            UPDATE parkings
               SET name = $2, city = $3, address = $4,
                   latitude = $5, longitude = $6, rating = $7,
                   map_url = COALESCE($8, map_url)
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(draft.name)
        .bind(draft.city)
        .bind(draft.address)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.rating)
        .bind(draft.map_url)
        .fetch_optional(&self.db)
        .await
        .context("update parking")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM parkings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete parking")?;
        Ok(res.rows_affected() > 0)
    }
}
