mod read;
mod write;

use sqlx::SqliteConnection;

use crate::error::RebuildError;

pub use write::{DeletedRows, NewMetadata, StatisticsTable};

/// Column sets of the recorder statistics tables, as found in the database at hand.
#[derive(Debug, Clone)]
pub struct RecorderSchema {
    meta: Vec<String>,
    statistics: Vec<String>,
    short_term: Vec<String>,
}

impl RecorderSchema {
    pub async fn load(conn: &mut SqliteConnection) -> anyhow::Result<Self> {
        let schema = Self {
            meta: table_columns(conn, "statistics_meta").await?,
            statistics: table_columns(conn, "statistics").await?,
            short_term: table_columns(conn, "statistics_short_term").await?,
        };

        if !is_keyed(&schema.statistics) {
            return Err(RebuildError::UnsupportedSchema { table: "statistics" }.into());
        }

        if !schema.has_short_term() {
            tracing::warn!("No usable statistics_short_term table, skipping 5-minute statistics");
        }

        Ok(schema)
    }

    pub fn has_short_term(&self) -> bool {
        is_keyed(&self.short_term)
    }

    fn columns(&self, table: StatisticsTable) -> &[String] {
        match table {
            StatisticsTable::LongTerm => &self.statistics,
            StatisticsTable::ShortTerm => &self.short_term,
        }
    }

    fn has_column(&self, table: StatisticsTable, column: &str) -> bool {
        self.columns(table).iter().any(|c| c == column)
    }
}

fn is_keyed(columns: &[String]) -> bool {
    ["metadata_id", "start_ts"]
        .iter()
        .all(|required| columns.iter().any(|c| c == required))
}

//empty for a missing table
async fn table_columns(conn: &mut SqliteConnection, table: &str) -> anyhow::Result<Vec<String>> {
    let columns = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(&mut *conn)
        .await?;

    Ok(columns)
}

#[cfg(test)]
pub mod test_support {
    use sqlx::{Connection as _, SqliteConnection};

    pub const SCHEMA: &str = r#"
        CREATE TABLE statistics_meta (
            id INTEGER PRIMARY KEY,
            statistic_id VARCHAR(255),
            source VARCHAR(32),
            unit_of_measurement VARCHAR(255),
            has_mean BOOLEAN,
            has_sum BOOLEAN,
            name VARCHAR(255),
            mean_type SMALLINT NOT NULL
        );
        CREATE TABLE statistics (
            id INTEGER PRIMARY KEY,
            created DATETIME,
            created_ts FLOAT,
            metadata_id INTEGER,
            start DATETIME,
            start_ts FLOAT,
            mean FLOAT,
            mean_weight FLOAT,
            min FLOAT,
            max FLOAT,
            last_reset DATETIME,
            last_reset_ts FLOAT,
            state FLOAT,
            sum FLOAT,
            UNIQUE (metadata_id, start_ts)
        );
        CREATE TABLE statistics_short_term (
            id INTEGER PRIMARY KEY,
            created DATETIME,
            created_ts FLOAT,
            metadata_id INTEGER,
            start DATETIME,
            start_ts FLOAT,
            mean FLOAT,
            mean_weight FLOAT,
            min FLOAT,
            max FLOAT,
            last_reset DATETIME,
            last_reset_ts FLOAT,
            state FLOAT,
            sum FLOAT,
            UNIQUE (metadata_id, start_ts)
        );
    "#;

    pub async fn recorder_db() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        setup(&mut conn).await;
        conn
    }

    pub async fn setup(conn: &mut SqliteConnection) {
        sqlx::raw_sql(SCHEMA).execute(&mut *conn).await.unwrap();
    }

    pub async fn add_statistic(conn: &mut SqliteConnection, statistic_id: &str) -> i64 {
        sqlx::query(
            "INSERT INTO statistics_meta (statistic_id, source, unit_of_measurement, has_mean, has_sum, name, mean_type)
                VALUES (?, 'recorder', 'kWh', 1, 0, ?, 1)",
        )
        .bind(statistic_id)
        .bind(statistic_id)
        .execute(&mut *conn)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn add_row(
        conn: &mut SqliteConnection,
        table: &str,
        metadata_id: i64,
        start_ts: f64,
        mean: Option<f64>,
        state: Option<f64>,
        sum: Option<f64>,
    ) {
        sqlx::query(&format!(
            "INSERT INTO {} (metadata_id, start_ts, mean, state, sum) VALUES (?, ?, ?, ?, ?)",
            table
        ))
        .bind(metadata_id)
        .bind(start_ts)
        .bind(mean)
        .bind(state)
        .bind(sum)
        .execute(&mut *conn)
        .await
        .unwrap();
    }
}
