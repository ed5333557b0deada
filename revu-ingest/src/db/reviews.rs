//! Review row inserts and joined reads

use crate::models::CommittedReview;
use chrono::Utc;
use revu_common::{Error, Result};
use sqlx::SqlitePool;

/// Insert one review, returning its id
pub async fn insert_review(
    pool: &SqlitePool,
    product_id: i64,
    reviewer_name: &str,
    rating: u8,
    comment: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO reviews (product_id, user_name, rating, comment, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(product_id)
    .bind(reviewer_name)
    .bind(rating as i64)
    .bind(comment)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Load a review joined with its product's name and image
pub async fn get_review_with_product(pool: &SqlitePool, id: i64) -> Result<CommittedReview> {
    sqlx::query_as::<_, CommittedReview>(
        r#"
        SELECT r.id, r.product_id, r.user_name, r.rating, r.comment, r.created_at,
               p.name AS product_name, p.image_url AS product_image
        FROM reviews r
        JOIN products p ON r.product_id = p.id
        WHERE r.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Review {}", id)))
}

pub async fn count_reviews(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
