use std::str::FromStr as _;

use anyhow::Context as _;
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    url: String,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    //single connection: the recorder database is written in one transaction and must not be shared
    pub async fn new_pool(&self) -> anyhow::Result<sqlx::SqlitePool> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .with_context(|| format!("Invalid database url {}", self.url))?
            .create_if_missing(false);

        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Error connecting to database {}", self.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connects_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorder.db");
        std::fs::File::create(&path).unwrap();

        let config = DatabaseConfig::new(format!("sqlite://{}", path.display()));
        let pool = config.new_pool().await.unwrap();

        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.db");

        let config = DatabaseConfig::new(format!("sqlite://{}", path.display()));

        assert!(config.new_pool().await.is_err());
    }
}
