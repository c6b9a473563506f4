//! ONNX classifier loader

use crate::config::ModelSpec;
use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use crate::models::inference::ChurnClassifier;
use anyhow::{bail, ensure, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// A churn classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    /// Display name, e.g. "XGBoost"
    name: String,
    /// `run` needs exclusive access to the session
    session: Mutex<Session>,
    /// Input name for the model
    input_name: String,
    /// Output name for probabilities
    output_name: String,
}

impl ChurnClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        let values = features.to_vec();
        let shape = vec![1_i64, FEATURE_COUNT as i64];
        let input_tensor =
            Tensor::from_array((shape, values)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .with_context(|| format!("Inference failed for {}", self.name))?;

        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("{} produced no '{}' output", self.name, self.output_name))?;

        let (shape, data) = output.try_extract_tensor::<f32>().with_context(|| {
            format!(
                "{} output '{}' is not a float tensor (export with zipmap disabled)",
                self.name, self.output_name
            )
        })?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let probability = positive_class_probability(&dims, data)?;

        debug!(model = %self.name, probability, "Model inference complete");
        Ok(probability)
    }
}

/// Pick the churn-class probability out of a `[1, 2]`, `[1, 1]`, `[2]` or `[1]` tensor.
fn positive_class_probability(dims: &[i64], data: &[f32]) -> Result<f64> {
    let classes = match dims {
        [1, n] | [n] => *n,
        _ => bail!("Unexpected probability tensor shape {:?}", dims),
    };

    let probability = match classes {
        2 => data.get(1),
        1 => data.first(),
        n => bail!("Expected 1 or 2 probability columns, got {}", n),
    }
    .copied()
    .context("Probability tensor is empty")? as f64;

    ensure!(
        (0.0..=1.0).contains(&probability),
        "Model returned probability {} outside [0, 1]",
        probability
    );

    Ok(probability)
}

/// Loader for ONNX classifier artifacts
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<OnnxClassifier> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(OnnxClassifier {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Load every configured model from a directory.
    ///
    /// A missing or broken artifact is fatal: the ensemble average is only
    /// meaningful with the full model set.
    pub fn load_all_models<P: AsRef<Path>>(
        &self,
        models_dir: P,
        specs: &[ModelSpec],
    ) -> Result<Vec<OnnxClassifier>> {
        let models_dir = models_dir.as_ref();
        ensure!(!specs.is_empty(), "No models configured");

        let mut models = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = models_dir.join(&spec.file);
            ensure!(
                path.exists(),
                "Model file for {} not found: {}",
                spec.name,
                path.display()
            );
            models.push(self.load_model(&path, &spec.name)?);
        }

        info!(
            count = models.len(),
            "Loaded {} models from {}",
            models.len(),
            models_dir.display()
        );

        Ok(models)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
