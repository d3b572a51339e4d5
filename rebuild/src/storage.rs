use std::path::{Path, PathBuf};

use anyhow::Context as _;
use energy::{
    Channel, Totals,
    persistence::{parse_document, read_document, to_pretty_json, write_atomic},
    time::DateTime,
};
use serde_json::{Value, json};

use crate::{error::RebuildError, settings::StorageLocation};

const MIN_MATCHING_TOTALS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct StorageCandidate {
    pub path: PathBuf,
    pub key: Option<String>,
    pub last_processed: Option<String>,
    pub matching_totals: usize,
}

/// Storage documents in `dir` holding energy totals, best match first.
pub async fn discover(dir: &Path) -> anyhow::Result<Vec<StorageCandidate>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Error reading storage directory {}", dir.display()))?;

    let mut candidates = vec![];
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            continue;
        };
        let Ok(document) = parse_document(&path, &content) else {
            continue;
        };

        let matching_totals = Channel::ALL
            .iter()
            .filter(|c| document.pointer(&format!("/data/totals/{}", c.storage_key())).is_some())
            .count();

        if matching_totals >= MIN_MATCHING_TOTALS {
            candidates.push(StorageCandidate {
                path,
                key: document.get("key").and_then(Value::as_str).map(str::to_owned),
                last_processed: document
                    .pointer("/data/last_processed")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                matching_totals,
            });
        }
    }

    candidates.sort_by(|a, b| b.matching_totals.cmp(&a.matching_totals).then_with(|| a.path.cmp(&b.path)));
    Ok(candidates)
}

/// The configured storage file, or the best discovered candidate of the configured directory.
pub async fn resolve(location: &StorageLocation) -> anyhow::Result<PathBuf> {
    if let Some(file) = &location.file {
        read_document(file).await?;
        return Ok(file.clone());
    }

    let Some(dir) = &location.dir else {
        return Err(RebuildError::NoStorageLocation.into());
    };

    let candidates = discover(dir).await?;
    for candidate in &candidates {
        tracing::info!(
            "Storage candidate {} | key={} | last_processed={} | totals_match={}/8",
            candidate.path.display(),
            candidate.key.as_deref().unwrap_or("-"),
            candidate.last_processed.as_deref().unwrap_or("n/a"),
            candidate.matching_totals
        );
    }

    match candidates.into_iter().next() {
        Some(best) => Ok(best.path),
        None => Err(RebuildError::NoStorageFile { dir: dir.clone() }.into()),
    }
}

/// Replaces all eight totals and the last processed hour, leaving every other field untouched.
pub fn patch(document: &mut Value, totals: &Totals, last_processed: DateTime) -> anyhow::Result<()> {
    let data = document
        .get_mut("data")
        .and_then(Value::as_object_mut)
        .context("Storage document has no data object")?;

    data.insert("last_processed".to_owned(), json!(last_processed.to_iso_string()));

    let stored_totals = data
        .get_mut("totals")
        .and_then(Value::as_object_mut)
        .context("Storage document has no data.totals object")?;

    for channel in Channel::ALL {
        stored_totals.insert(channel.storage_key().to_owned(), json!(totals.get(channel)));
    }

    Ok(())
}

pub async fn patch_file(path: &Path, totals: &Totals, last_processed: DateTime) -> anyhow::Result<Value> {
    let mut document = read_document(path).await?;
    patch(&mut document, totals, last_processed)?;

    write_atomic(path, &to_pretty_json(&document)?).await?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;

    use super::*;

    fn write(dir: &Path, name: &str, content: &Value) {
        std::fs::write(dir.join(name), serde_json::to_string(content).unwrap()).unwrap();
    }

    fn totals_doc(key: &str, keys: &[&str]) -> Value {
        let totals: serde_json::Map<String, Value> = keys.iter().map(|k| (k.to_string(), json!(1.0))).collect();
        json!({ "version": 1, "key": key, "data": { "totals": totals, "last_processed": "2024-01-01T00:00:00+00:00" } })
    }

    const ALL_KEYS: [&str; 8] = [
        "prod_cooling_total",
        "prod_heating_total",
        "prod_hot_water_total",
        "used_cooling_total",
        "used_heating_total",
        "used_hot_water_total",
        "aux_used_heating_total",
        "aux_used_hot_water_total",
    ];

    #[tokio::test]
    async fn test_discover_ranks_by_matching_totals() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "partial", &totals_doc("partial", &ALL_KEYS[..6]));
        write(dir.path(), "full", &totals_doc("full", &ALL_KEYS));
        write(dir.path(), "too_few", &totals_doc("too_few", &ALL_KEYS[..5]));
        write(dir.path(), "core.config", &json!({ "version": 1, "data": {} }));
        std::fs::write(dir.path().join("broken"), "{").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let candidates = discover(dir.path()).await.unwrap();

        let names: Vec<(String, usize)> = candidates
            .iter()
            .map(|c| (c.key.clone().unwrap(), c.matching_totals))
            .collect();
        assert_eq!(names, vec![("full".to_owned(), 8), ("partial".to_owned(), 6)]);
        assert_eq!(
            candidates[0].last_processed.as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn test_resolve_prefers_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mine", &totals_doc("mine", &[]));
        write(dir.path(), "other", &totals_doc("other", &ALL_KEYS));

        let resolved = resolve(&StorageLocation {
            file: Some(dir.path().join("mine")),
            dir: Some(dir.path().to_owned()),
        })
        .await
        .unwrap();

        assert_eq!(resolved, dir.path().join("mine"));
    }

    #[tokio::test]
    async fn test_resolve_without_candidates_fails() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve(&StorageLocation {
            file: None,
            dir: Some(dir.path().to_owned()),
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RebuildError>(),
            Some(RebuildError::NoStorageFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_file_without_totals() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad", &json!({ "data": { "something": 1 } }));

        let result = resolve(&StorageLocation {
            file: Some(dir.path().join("bad")),
            dir: None,
        })
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_patch_sets_totals_and_keeps_other_fields() {
        let mut document = json!({
            "version": 1,
            "minor_version": 1,
            "key": "energy_conversion_data",
            "data": {
                "totals": { "prod_heating_total": 99.0, "legacy_total": 5.0 },
                "last_processed": null,
                "last_cop": 3.2
            }
        });
        let totals = Totals {
            prod_heating_total: 5.0,
            used_heating_total: 2.0,
            aux_used_heating_total: 0.5,
            ..Default::default()
        };

        patch(
            &mut document,
            &totals,
            DateTime::from_iso("2024-03-01T11:00:00Z").unwrap(),
        )
        .unwrap();

        assert_json_eq!(
            document,
            json!({
                "version": 1,
                "minor_version": 1,
                "key": "energy_conversion_data",
                "data": {
                    "totals": {
                        "prod_cooling_total": 0.0,
                        "prod_heating_total": 5.0,
                        "prod_hot_water_total": 0.0,
                        "used_cooling_total": 0.0,
                        "used_heating_total": 2.0,
                        "used_hot_water_total": 0.0,
                        "aux_used_heating_total": 0.5,
                        "aux_used_hot_water_total": 0.0,
                        "legacy_total": 5.0
                    },
                    "last_processed": "2024-03-01T11:00:00+00:00",
                    "last_cop": 3.2
                }
            })
        );
    }

    #[tokio::test]
    async fn test_patch_file_roundtrips_through_energy_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energy_conversion_data");
        write(dir.path(), "energy_conversion_data", &totals_doc("energy_conversion_data", &ALL_KEYS));
        let totals = Totals {
            used_cooling_total: 12.25,
            ..Default::default()
        };
        let last = DateTime::from_iso("2024-03-01T11:00:00Z").unwrap();

        patch_file(&path, &totals, last).await.unwrap();

        let store = energy::persistence::JsonFileStore::new(&path, "energy_conversion_data");
        let state = energy::StateStore::load(&store).await.unwrap().unwrap();
        assert_eq!(state.totals, totals);
        assert_eq!(state.last_processed, Some(last));
    }
}
