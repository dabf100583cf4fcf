//! The two JSON artifacts handed from ingestion to the explorer.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::{GrantDataset, OptionsMap, Record};
use crate::config::ExplorerConfig;
use crate::error::ArtifactError;

pub const RECORDS_FILE: &str = "grants.json";
pub const OPTIONS_FILE: &str = "options.json";

/// Write `grants.json` and `options.json` into `dir`, creating it if needed.
pub fn write_artifacts(
    dir: &Path,
    records: &[Record],
    options: &OptionsMap,
) -> Result<(PathBuf, PathBuf), ArtifactError> {
    std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let records_path = dir.join(RECORDS_FILE);
    write_json(&records_path, records)?;
    info!("Wrote {} rows -> {}", records.len(), records_path.display());

    let options_path = dir.join(OPTIONS_FILE);
    write_json(&options_path, options)?;
    info!(
        "Wrote options for {} columns -> {}",
        options.len(),
        options_path.display()
    );

    Ok((records_path, options_path))
}

/// Read both artifacts from `dir`. Either both load or the first failure is
/// returned, naming the artifact.
pub fn load_artifacts(dir: &Path, config: &ExplorerConfig) -> Result<GrantDataset, ArtifactError> {
    let records: Vec<Record> = read_json(&dir.join(RECORDS_FILE))?;
    let options: OptionsMap = read_json(&dir.join(OPTIONS_FILE))?;
    info!(
        "loaded {} grants and {} option columns from {}",
        records.len(),
        options.len(),
        dir.display()
    );
    Ok(GrantDataset::from_parts(records, options, config))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}
