// File: src/persistence.rs
use crate::config::EstimatorConfig;
use crate::core::model::{ModelArtifact, Predictor};
use crate::core::types::FeatureSchema;
use crate::error::{EstimatorError, EstimatorResult};
use bincode::Options;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// The two read-only artifacts, loaded together.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub artifact: ModelArtifact,
    pub schema: FeatureSchema,
}

/// Loads the model and its feature schema, and checks that they agree.
///
/// Any failure here leaves nothing to serve with, so callers should abort startup.
pub fn load_model(config: &EstimatorConfig) -> EstimatorResult<ModelBundle> {
    let artifact = load_artifact(&config.model_path)?;

    let schema = load_schema(&config.schema_path)?;
    schema.validate()?;

    let expected = artifact.model.n_features();
    if schema.len() != expected {
        return Err(EstimatorError::schema_mismatch(format!(
            "schema {} has {} columns but the model expects {}",
            config.schema_path.display(),
            schema.len(),
            expected
        )));
    }

    let unmatched = schema.unmatched_districts();
    if !unmatched.is_empty() {
        let labels: Vec<&str> = unmatched.iter().map(|d| d.label()).collect();
        warn!(
            districts = ?labels,
            "form districts without a location column will be estimated without location"
        );
    }

    info!(
        model = %config.model_path.display(),
        kind = artifact.model.kind(),
        features = expected,
        "model loaded"
    );
    Ok(ModelBundle { artifact, schema })
}

/// Decodes a model artifact and runs the structural checks on its model.
pub fn load_artifact(path: &Path) -> EstimatorResult<ModelArtifact> {
    let file = File::open(path).map_err(|e| {
        EstimatorError::predictor_unavailable(format!("cannot open {}: {}", path.display(), e))
    })?;
    // A corrupt length prefix must not be able to request more bytes than the file holds.
    let limit = file.metadata()?.len();
    let reader = BufReader::new(file);
    let artifact: ModelArtifact = if is_json(path) {
        serde_json::from_reader(reader).map_err(|e| decode_error(path, e))?
    } else {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(limit)
            .deserialize_from(reader)
            .map_err(|e| decode_error(path, e))?
    };
    artifact.model.validate()?;
    debug!(path = %path.display(), "model artifact decoded");
    Ok(artifact)
}

pub fn load_schema(path: &Path) -> EstimatorResult<FeatureSchema> {
    let file = File::open(path).map_err(|e| {
        EstimatorError::schema_mismatch(format!("cannot open {}: {}", path.display(), e))
    })?;
    let schema: FeatureSchema = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        EstimatorError::schema_mismatch(format!("cannot decode {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), columns = schema.len(), "feature schema decoded");
    Ok(schema)
}

/// Writes both artifacts atomically. Used by artifact producers, never by the serving path.
pub fn save_model(
    bundle: &ModelBundle,
    model_path: &Path,
    schema_path: &Path,
) -> EstimatorResult<()> {
    if is_json(model_path) {
        write_atomic(model_path, |w| {
            serde_json::to_writer_pretty(w, &bundle.artifact).map_err(EstimatorError::from)
        })?;
    } else {
        write_atomic(model_path, |w| {
            bincode::serialize_into(w, &bundle.artifact).map_err(EstimatorError::from)
        })?;
    }
    write_atomic(schema_path, |w| {
        serde_json::to_writer_pretty(w, &bundle.schema).map_err(EstimatorError::from)
    })?;
    info!(model = %model_path.display(), schema = %schema_path.display(), "model saved");
    Ok(())
}

fn write_atomic<F>(path: &Path, write: F) -> EstimatorResult<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> EstimatorResult<()>,
{
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file
        .persist(path)
        .map_err(|e| EstimatorError::Io(e.error))?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> EstimatorError {
    EstimatorError::predictor_unavailable(format!("cannot decode {}: {}", path.display(), err))
}
