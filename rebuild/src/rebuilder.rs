use std::path::PathBuf;

use energy::{Channel, Totals, t, time::DateTime};
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::RebuildError,
    history::{HistoryInputs, OutputChannel, RebuildPlan},
    settings::Settings,
    statistics::{DeletedRows, NewMetadata, RecorderSchema, StatisticsTable},
    storage,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OutputReport {
    pub output: OutputChannel,
    pub statistic_id: String,
    pub deleted: DeletedRows,
    pub inserted_hourly: u64,
    pub inserted_short_term: u64,
}

#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub storage_file: PathBuf,
    pub first_hour: DateTime,
    pub last_hour: DateTime,
    pub hours: usize,
    pub totals: Totals,
    pub outputs: Vec<OutputReport>,
    pub dry_run: bool,
}

pub struct Rebuilder<'a> {
    pool: SqlitePool,
    settings: &'a Settings,
}

impl<'a> Rebuilder<'a> {
    pub fn new(pool: SqlitePool, settings: &'a Settings) -> Self {
        Self { pool, settings }
    }

    /// Rebuilds all output statistics inside one transaction, then patches the storage file.
    /// Nothing is written in a dry run.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, dry_run: bool) -> anyhow::Result<RebuildReport> {
        let storage_file = storage::resolve(&self.settings.storage).await?;
        tracing::info!("Using storage file {}", storage_file.display());

        let mut tx = self.pool.begin().await?;

        let schema = RecorderSchema::load(&mut tx).await?;
        self.check_statistics_exist(&schema, &mut tx).await?;

        let inputs = self.load_inputs(&schema, &mut tx).await?;
        let Some(plan) = RebuildPlan::compute(&inputs, self.settings.short_term_days) else {
            anyhow::bail!("No input samples to rebuild from");
        };
        let (Some(first_hour), Some(last_hour)) = (plan.first(), plan.last_processed()) else {
            anyhow::bail!("Rebuild plan has an empty timeline");
        };

        tracing::info!(
            "Timeline hours: {} | {} .. {}",
            plan.timeline.len(),
            first_hour,
            last_hour
        );

        let mut outputs = vec![];
        let now = t!(now);

        for history in &plan.outputs {
            let statistic_id = self.settings.outputs.statistic_id(history.output);

            let report = if dry_run {
                OutputReport {
                    output: history.output,
                    statistic_id: statistic_id.to_owned(),
                    deleted: DeletedRows::default(),
                    inserted_hourly: history.hourly.len() as u64,
                    inserted_short_term: if schema.has_short_term() {
                        history.short_term.len() as u64
                    } else {
                        0
                    },
                }
            } else {
                let deleted = schema.delete_statistic(&mut tx, statistic_id).await?;
                let metadata_id = schema
                    .create_metadata(
                        &mut tx,
                        &NewMetadata {
                            statistic_id,
                            source: &self.settings.source_tag,
                            unit: &self.settings.unit,
                            name: statistic_id,
                        },
                    )
                    .await?;

                let inserted_hourly = schema
                    .insert_points(&mut tx, StatisticsTable::LongTerm, metadata_id, &history.hourly, now)
                    .await?;

                let inserted_short_term = if schema.has_short_term() {
                    schema
                        .insert_points(&mut tx, StatisticsTable::ShortTerm, metadata_id, &history.short_term, now)
                        .await?
                } else {
                    0
                };

                OutputReport {
                    output: history.output,
                    statistic_id: statistic_id.to_owned(),
                    deleted,
                    inserted_hourly,
                    inserted_short_term,
                }
            };

            tracing::info!(
                "OUT {}: deleted stats={} sts={} meta={} | inserted LTS={} STS={} | final {:.3} kWh",
                report.output,
                report.deleted.statistics,
                report.deleted.short_term,
                report.deleted.meta,
                report.inserted_hourly,
                report.inserted_short_term,
                history.last_value()
            );
            outputs.push(report);
        }

        if dry_run {
            tx.rollback().await?;
            tracing::info!("Dry run, database and storage file left untouched");
        } else {
            tx.commit().await?;
            storage::patch_file(&storage_file, &plan.totals, last_hour).await?;
            tracing::info!("Storage patched, last_processed = {}", last_hour);
        }

        Ok(RebuildReport {
            storage_file,
            first_hour,
            last_hour,
            hours: plan.timeline.len(),
            totals: plan.totals,
            outputs,
            dry_run,
        })
    }

    async fn check_statistics_exist(&self, schema: &RecorderSchema, conn: &mut SqliteConnection) -> anyhow::Result<()> {
        let inputs = Channel::ALL
            .iter()
            .map(|c| (c.to_string(), self.settings.inputs.statistic_id(*c)));
        let outputs = OutputChannel::ALL
            .iter()
            .map(|o| (o.to_string(), self.settings.outputs.statistic_id(*o)));

        for (role, statistic_id) in inputs.chain(outputs) {
            if !schema.statistic_exists(conn, statistic_id).await? {
                return Err(RebuildError::UnknownStatistic {
                    statistic_id: statistic_id.to_owned(),
                    role,
                }
                .into());
            }
        }

        Ok(())
    }

    async fn load_inputs(&self, schema: &RecorderSchema, conn: &mut SqliteConnection) -> anyhow::Result<HistoryInputs> {
        let mut inputs = HistoryInputs::default();

        for channel in Channel::ALL {
            let statistic_id = self.settings.inputs.statistic_id(channel);
            let points = schema.load_hourly(conn, statistic_id).await?;
            let usable = inputs.insert(channel, points);

            if usable < 2 {
                return Err(RebuildError::NotEnoughPoints {
                    role: channel.to_string(),
                    statistic_id: statistic_id.to_owned(),
                    count: usable,
                }
                .into());
            }

            tracing::info!("Loaded {} points for {}", usable, channel);
        }

        Ok(inputs)
    }
}
