use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseSettings;
use crate::models::{BoundingBox, Post, ServiceOffer, ServiceRequest, User};

/// Errors that can occur when interacting with the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Conflict(format!("{} already exists", what));
        }
    }
    StoreError::Sqlx(err)
}

/// PostgreSQL entity store
///
/// The single source of users, posts, service requests and offers. Candidate
/// queries for spatial filtering are restricted to the caller's bounding box
/// here, so unbounded candidate sets never reach memory.
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    // ---- users ----

    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let query = r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "user"))
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT * FROM users WHERE username = $1";

        Ok(sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT * FROM users WHERE email = $1";

        Ok(sqlx::query_as::<_, User>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = "SELECT * FROM users WHERE id = $1";

        Ok(sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ---- posts ----

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_post(
        &self,
        title: &str,
        content: &str,
        category: Option<&str>,
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        user_id: i64,
    ) -> Result<Post, StoreError> {
        let query = r#"
            INSERT INTO posts (title, content, category, location, latitude, longitude, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
        "#;

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(title)
            .bind(content)
            .bind(category)
            .bind(location)
            .bind(latitude)
            .bind(longitude)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let query = "SELECT * FROM posts WHERE id = $1";

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update_post(
        &self,
        id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Post>, StoreError> {
        let query = r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING *
        "#;

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(id)
            .bind(title)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn delete_post(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_posts(&self, category: Option<&str>) -> Result<i64, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS total
            FROM posts
            WHERE ($1::text IS NULL OR category = $1)
        "#;

        let row = sqlx::query(query)
            .bind(category)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("total"))
    }

    /// Offset page of posts, newest first (pagination pushed down to the store)
    pub async fn list_posts_page(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let query = r#"
            SELECT * FROM posts
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
        "#;

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Cursor page of posts: id > after_id, ascending
    pub async fn list_posts_after(
        &self,
        category: Option<&str>,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let query = r#"
            SELECT * FROM posts
            WHERE ($1::text IS NULL OR category = $1)
              AND id > $2
            ORDER BY id ASC
            LIMIT $3
        "#;

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(category)
            .bind(after_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Located posts inside a bounding box.
    ///
    /// The box is a superset of any radius it was derived from; the exact
    /// distance filter runs in memory afterwards.
    pub async fn list_located_posts(
        &self,
        category: Option<&str>,
        bbox: &BoundingBox,
    ) -> Result<Vec<Post>, StoreError> {
        let query = r#"
            SELECT * FROM posts
            WHERE ($1::text IS NULL OR category = $1)
              AND latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
        "#;

        Ok(sqlx::query_as::<_, Post>(query)
            .bind(category)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(&self.pool)
            .await?)
    }

    // ---- service requests / offers ----

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_service_request(
        &self,
        title: &str,
        description: &str,
        category: &str,
        budget: Option<f64>,
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_km: f64,
        user_id: i64,
    ) -> Result<ServiceRequest, StoreError> {
        let query = r#"
            INSERT INTO service_requests
                (title, description, category, budget, location, latitude, longitude, radius_km, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        "#;

        Ok(sqlx::query_as::<_, ServiceRequest>(query)
            .bind(title)
            .bind(description)
            .bind(category)
            .bind(budget)
            .bind(location)
            .bind(latitude)
            .bind(longitude)
            .bind(radius_km)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn get_service_request(&self, id: i64) -> Result<Option<ServiceRequest>, StoreError> {
        let query = "SELECT * FROM service_requests WHERE id = $1";

        Ok(sqlx::query_as::<_, ServiceRequest>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_service_offer(
        &self,
        title: &str,
        description: &str,
        category: &str,
        hourly_rate: Option<f64>,
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_km: f64,
        user_id: i64,
    ) -> Result<ServiceOffer, StoreError> {
        let query = r#"
            INSERT INTO service_offers
                (title, description, category, hourly_rate, location, latitude, longitude, radius_km, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        "#;

        Ok(sqlx::query_as::<_, ServiceOffer>(query)
            .bind(title)
            .bind(description)
            .bind(category)
            .bind(hourly_rate)
            .bind(location)
            .bind(latitude)
            .bind(longitude)
            .bind(radius_km)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// All offers in a category, located or not
    pub async fn count_offers_in_category(&self, category: &str) -> Result<i64, StoreError> {
        let query = "SELECT COUNT(*) AS total FROM service_offers WHERE category = $1";

        let row = sqlx::query(query)
            .bind(category)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("total"))
    }

    /// Located offers of one category inside a bounding box
    pub async fn list_offers_in_bbox(
        &self,
        category: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<ServiceOffer>, StoreError> {
        let query = r#"
            SELECT * FROM service_offers
            WHERE category = $1
              AND latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
        "#;

        Ok(sqlx::query_as::<_, ServiceOffer>(query)
            .bind(category)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(&self.pool)
            .await?)
    }
}
