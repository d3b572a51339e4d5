use energy::time::DateTime;
use sqlx::SqliteConnection;

use super::RecorderSchema;
use crate::history::DataPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsTable {
    LongTerm,
    ShortTerm,
}

impl StatisticsTable {
    pub fn name(&self) -> &'static str {
        match self {
            StatisticsTable::LongTerm => "statistics",
            StatisticsTable::ShortTerm => "statistics_short_term",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    pub statistics: u64,
    pub short_term: u64,
    pub meta: u64,
}

#[derive(Debug, Clone)]
pub struct NewMetadata<'a> {
    pub statistic_id: &'a str,
    pub source: &'a str,
    pub unit: &'a str,
    pub name: &'a str,
}

//written in this order when present in the table
const ROW_COLUMNS: [&str; 13] = [
    "created",
    "created_ts",
    "metadata_id",
    "mean",
    "min",
    "max",
    "last_reset",
    "last_reset_ts",
    "mean_weight",
    "start",
    "start_ts",
    "state",
    "sum",
];

enum SqlValue {
    Null,
    Real(f64),
    Integer(i64),
    Text(String),
}

impl RecorderSchema {
    /// Removes all rows and all metadata entries of the statistic.
    pub async fn delete_statistic(&self, conn: &mut SqliteConnection, statistic_id: &str) -> anyhow::Result<DeletedRows> {
        let mut deleted = DeletedRows::default();

        for metadata_id in self.metadata_ids(conn, statistic_id).await? {
            deleted.statistics += delete_rows(conn, StatisticsTable::LongTerm, metadata_id).await?;

            if self.has_short_term() {
                deleted.short_term += delete_rows(conn, StatisticsTable::ShortTerm, metadata_id).await?;
            }

            deleted.meta += sqlx::query("DELETE FROM statistics_meta WHERE id = ?")
                .bind(metadata_id)
                .execute(&mut *conn)
                .await?
                .rows_affected();
        }

        Ok(deleted)
    }

    /// Registers the statistic as a sum without mean, returns the new metadata id.
    pub async fn create_metadata(&self, conn: &mut SqliteConnection, meta: &NewMetadata<'_>) -> anyhow::Result<i64> {
        let candidates: [(&str, SqlValue); 7] = [
            ("statistic_id", SqlValue::Text(meta.statistic_id.to_owned())),
            ("source", SqlValue::Text(meta.source.to_owned())),
            ("unit_of_measurement", SqlValue::Text(meta.unit.to_owned())),
            ("has_mean", SqlValue::Integer(0)),
            ("has_sum", SqlValue::Integer(1)),
            ("name", SqlValue::Text(meta.name.to_owned())),
            ("mean_type", SqlValue::Integer(0)),
        ];

        let (columns, values): (Vec<&str>, Vec<SqlValue>) = candidates
            .into_iter()
            .filter(|(column, _)| self.meta.iter().any(|c| c == column))
            .unzip();

        let sql = format!(
            "INSERT INTO statistics_meta ({}) VALUES ({})",
            columns.join(","),
            placeholders(columns.len())
        );

        let mut query = sqlx::query(&sql);
        for value in values {
            query = bind(query, value);
        }

        Ok(query.execute(&mut *conn).await?.last_insert_rowid())
    }

    /// Writes one row per data point, replacing rows with the same start.
    pub async fn insert_points(
        &self,
        conn: &mut SqliteConnection,
        table: StatisticsTable,
        metadata_id: i64,
        points: &[DataPoint],
        now: DateTime,
    ) -> anyhow::Result<u64> {
        let columns: Vec<&str> = ROW_COLUMNS
            .into_iter()
            .filter(|column| self.has_column(table, column))
            .collect();

        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(","),
            placeholders(columns.len())
        );

        let mut inserted = 0;
        for dp in points {
            let mut query = sqlx::query(&sql);
            for column in &columns {
                query = bind(query, row_value(column, metadata_id, now, dp));
            }

            inserted += query.execute(&mut *conn).await?.rows_affected();
        }

        Ok(inserted)
    }
}

async fn delete_rows(conn: &mut SqliteConnection, table: StatisticsTable, metadata_id: i64) -> anyhow::Result<u64> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE metadata_id = ?", table.name()))
        .bind(metadata_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

fn row_value(column: &str, metadata_id: i64, now: DateTime, dp: &DataPoint) -> SqlValue {
    match column {
        "created" => SqlValue::Text(now.to_iso_string()),
        "created_ts" => SqlValue::Real(now.timestamp_secs()),
        "metadata_id" => SqlValue::Integer(metadata_id),
        "mean_weight" => SqlValue::Integer(0),
        "start" => SqlValue::Text(dp.timestamp.to_iso_string()),
        "start_ts" => SqlValue::Real(dp.timestamp.timestamp_secs()),
        "state" | "sum" => SqlValue::Real(dp.value),
        _ => SqlValue::Null,
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

fn bind<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<f64>),
        SqlValue::Real(v) => query.bind(v),
        SqlValue::Integer(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
    }
}
