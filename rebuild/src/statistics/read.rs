use energy::time::DateTime;
use sqlx::SqliteConnection;

use super::{RecorderSchema, StatisticsTable};
use crate::history::DataPoint;

const VALUE_PRIORITY: [&str; 3] = ["mean", "state", "sum"];

impl RecorderSchema {
    pub async fn statistic_exists(&self, conn: &mut SqliteConnection, statistic_id: &str) -> anyhow::Result<bool> {
        Ok(self.metadata_id(conn, statistic_id).await?.is_some())
    }

    pub async fn metadata_id(&self, conn: &mut SqliteConnection, statistic_id: &str) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM statistics_meta WHERE statistic_id = ? ORDER BY id LIMIT 1")
            .bind(statistic_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id)
    }

    pub(super) async fn metadata_ids(&self, conn: &mut SqliteConnection, statistic_id: &str) -> anyhow::Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM statistics_meta WHERE statistic_id = ? ORDER BY id")
            .bind(statistic_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(ids)
    }

    /// Hourly values of a statistic in ascending order, each row collapsed to its first usable
    /// value of mean, state and sum. Rows without any usable value are skipped.
    pub async fn load_hourly(&self, conn: &mut SqliteConnection, statistic_id: &str) -> anyhow::Result<Vec<DataPoint>> {
        let Some(metadata_id) = self.metadata_id(conn, statistic_id).await? else {
            return Ok(vec![]);
        };

        let value_columns: Vec<String> = VALUE_PRIORITY
            .iter()
            .map(|column| {
                if self.has_column(StatisticsTable::LongTerm, column) {
                    format!("CAST({column} AS REAL) AS {column}")
                } else {
                    format!("NULL AS {column}")
                }
            })
            .collect();

        let sql = format!(
            "SELECT CAST(start_ts AS REAL) AS start_ts, {} FROM statistics WHERE metadata_id = ? ORDER BY start_ts ASC",
            value_columns.join(", ")
        );

        let rows = sqlx::query_as::<_, (Option<f64>, Option<f64>, Option<f64>, Option<f64>)>(&sql)
            .bind(metadata_id)
            .fetch_all(&mut *conn)
            .await?;

        let points = rows
            .into_iter()
            .filter_map(|(start_ts, mean, state, sum)| {
                let timestamp = start_ts.and_then(DateTime::from_timestamp_secs)?;
                let value = [mean, state, sum].into_iter().flatten().find(|v| v.is_finite())?;
                Some(DataPoint::new(value, timestamp))
            })
            .collect();

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_statistic_exists() {
        let mut conn = recorder_db().await;
        add_statistic(&mut conn, "sensor.prod_heating_hour").await;
        let schema = RecorderSchema::load(&mut conn).await.unwrap();

        assert!(schema.statistic_exists(&mut conn, "sensor.prod_heating_hour").await.unwrap());
        assert!(!schema.statistic_exists(&mut conn, "sensor.unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_load_hourly_value_priority() {
        let mut conn = recorder_db().await;
        let id = add_statistic(&mut conn, "sensor.prod_heating_hour").await;
        add_row(&mut conn, "statistics", id, 7200.0, None, Some(2.0), Some(9.0)).await;
        add_row(&mut conn, "statistics", id, 3600.0, Some(1.5), Some(2.0), None).await;
        add_row(&mut conn, "statistics", id, 10800.0, None, None, Some(4.0)).await;
        add_row(&mut conn, "statistics", id, 14400.0, None, None, None).await;
        let schema = RecorderSchema::load(&mut conn).await.unwrap();

        let points = schema.load_hourly(&mut conn, "sensor.prod_heating_hour").await.unwrap();

        assert_eq!(
            points,
            vec![
                DataPoint::new(1.5, DateTime::from_timestamp_secs(3600.0).unwrap()),
                DataPoint::new(2.0, DateTime::from_timestamp_secs(7200.0).unwrap()),
                DataPoint::new(4.0, DateTime::from_timestamp_secs(10800.0).unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_hourly_ignores_other_statistics() {
        let mut conn = recorder_db().await;
        let id = add_statistic(&mut conn, "sensor.a").await;
        let other = add_statistic(&mut conn, "sensor.b").await;
        add_row(&mut conn, "statistics", id, 3600.0, Some(1.0), None, None).await;
        add_row(&mut conn, "statistics", other, 3600.0, Some(5.0), None, None).await;
        add_row(&mut conn, "statistics_short_term", id, 3900.0, Some(7.0), None, None).await;
        let schema = RecorderSchema::load(&mut conn).await.unwrap();

        let points = schema.load_hourly(&mut conn, "sensor.a").await.unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 1.0);
    }

    #[tokio::test]
    async fn test_load_hourly_unknown_statistic_is_empty() {
        let mut conn = recorder_db().await;
        let schema = RecorderSchema::load(&mut conn).await.unwrap();

        assert!(schema.load_hourly(&mut conn, "sensor.none").await.unwrap().is_empty());
    }
}
