use std::path::PathBuf;

use derive_more::derive::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum RebuildError {
    #[display("table {table} lacks the metadata_id/start_ts columns")]
    UnsupportedSchema { table: &'static str },
    #[display("statistic {statistic_id} ({role}) does not exist in statistics_meta")]
    UnknownStatistic { statistic_id: String, role: String },
    #[display("not enough usable points for input {role} ({statistic_id}): {count}")]
    NotEnoughPoints {
        role: String,
        statistic_id: String,
        count: usize,
    },
    #[display("no storage file with energy totals found in {}", dir.display())]
    NoStorageFile { dir: PathBuf },
    #[display("neither storage.file nor storage.dir is configured")]
    NoStorageLocation,
}
