//! 评价仓储（PostgreSQL）
//!
//! `(user_id, event_id)` 的唯一性由 `uq_reviews_user_event` 约束保证，
//! 写入使用 `ON CONFLICT DO NOTHING`，冲突时不会产生第二行。

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ReviewRepositoryTrait;
use crate::error::{Result, ReviewError};
use crate::models::{NewReview, Review, ReviewPatch};

const REVIEW_COLUMNS: &str = "id, event_id, user_id, rating, comment, created_at, updated_at";

/// 评价仓储
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepositoryTrait for ReviewRepository {
    async fn list_all(&self) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_by_event(&self, event_id: i64) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE event_id = $1 ORDER BY id"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn find_by_user_and_event(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND event_id = $2"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn exists_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, review: &NewReview) -> Result<Review> {
        let created = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(review.event_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or(ReviewError::DuplicateReview {
            user_id: review.user_id,
            event_id: review.event_id,
        })
    }

    async fn update(&self, id: i64, patch: &ReviewPatch) -> Result<Option<Review>> {
        let updated = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.rating)
        .bind(&patch.comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
