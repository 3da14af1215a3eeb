//! Loads the static administrative-division dataset.
//!
//! The dataset is a read-only JSON (optionally gzipped) file with one record
//! per division. Parsing tens of thousands of records is done on a blocking
//! task, and the parsed units are snapshotted as bincode next to the cache so
//! subsequent startups skip the JSON pass entirely.

use crate::divisions::error::DivisionError;
use crate::types::division::{AdministrativeUnit, DivisionLevel, LatLon};
use async_compression::tokio::bufread::GzipDecoder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, BufReader};

const SNAPSHOT_FILE_NAME: &str = "divisions.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// One row of the tabular dataset, as serialized on disk.
#[derive(Debug, Deserialize)]
struct DatasetRecord {
    code: String,
    name: String,
    #[serde(default)]
    parent_code: Option<String>,
    level: DivisionLevel,
    longitude: f64,
    latitude: f64,
    #[serde(default)]
    pinyin: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    population: Option<u64>,
}

impl From<DatasetRecord> for AdministrativeUnit {
    fn from(record: DatasetRecord) -> Self {
        AdministrativeUnit {
            code: record.code,
            name: record.name,
            parent_code: record.parent_code,
            level: record.level,
            coordinate: LatLon(record.latitude, record.longitude),
            pinyin: record.pinyin,
            aliases: record.aliases,
            population: record.population,
        }
    }
}

/// Loads the division set, preferring the bincode snapshot in `cache_dir`
/// over re-parsing the JSON dataset at `dataset_path`.
pub async fn load_units(
    dataset_path: &Path,
    cache_dir: &Path,
) -> Result<Vec<AdministrativeUnit>, DivisionError> {
    let snapshot = cache_dir.join(SNAPSHOT_FILE_NAME);

    if snapshot.exists() {
        let path = snapshot.clone();
        let units =
            tokio::task::spawn_blocking(move || read_snapshot(&path)).await??;
        return Ok(units);
    }

    let units = parse_dataset(dataset_path).await?;
    write_snapshot(units.clone(), &snapshot).await?;
    Ok(units)
}

fn read_snapshot(path: &Path) -> Result<Vec<AdministrativeUnit>, DivisionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| DivisionError::SnapshotRead(path.to_path_buf(), e))?;
    let (units, _) =
        bincode::serde::decode_from_slice::<Vec<AdministrativeUnit>, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| DivisionError::SnapshotDecode(path.to_path_buf(), Box::new(e)))?;
    Ok(units)
}

async fn parse_dataset(path: &Path) -> Result<Vec<AdministrativeUnit>, DivisionError> {
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");

    let bytes = if is_gzip {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| DivisionError::DatasetRead(path.to_path_buf(), e))?;
        let mut decoder = GzipDecoder::new(BufReader::new(file));
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .await
            .map_err(|e| DivisionError::DatasetRead(path.to_path_buf(), e))?;
        decompressed
    } else {
        tokio::fs::read(path)
            .await
            .map_err(|e| DivisionError::DatasetRead(path.to_path_buf(), e))?
    };

    let parse_start = std::time::Instant::now();
    let units: Vec<AdministrativeUnit> = tokio::task::spawn_blocking(move || {
        serde_json::from_slice::<Vec<DatasetRecord>>(&bytes)
            .map_err(DivisionError::from)
            .map(|records| {
                records
                    .into_iter()
                    .map(AdministrativeUnit::from)
                    .collect::<Vec<_>>()
            })
    })
    .await??;
    info!(
        "Parsed {} divisions from dataset in {:?}",
        units.len(),
        parse_start.elapsed()
    );
    Ok(units)
}

async fn write_snapshot(
    units: Vec<AdministrativeUnit>,
    path: &Path,
) -> Result<(), DivisionError> {
    let target = path.to_path_buf();
    let byte_count = tokio::task::spawn_blocking(move || {
        let encoded = bincode::serde::encode_to_vec(units, BINCODE_CONFIG)
            .map_err(|e| DivisionError::SnapshotEncode(Box::new(e)))?;
        let dir = target.parent().unwrap_or(Path::new(".")).to_path_buf();
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| DivisionError::SnapshotWrite(target.clone(), e))?;
        temp.write_all(&encoded)
            .map_err(|e| DivisionError::SnapshotWrite(target.clone(), e))?;
        // Atomic rename; a concurrently starting process sees either no
        // snapshot or a complete one, never a torn write.
        temp.persist(&target)
            .map_err(|e| DivisionError::SnapshotWrite(target, e.error))?;
        Ok::<usize, DivisionError>(encoded.len())
    })
    .await??;
    info!(
        "Wrote division snapshot ({} bytes) to {}",
        byte_count,
        path.display()
    );
    Ok(())
}
