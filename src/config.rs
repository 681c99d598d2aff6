//! Batch configuration
//!
//! A JSON document listing the areas and indices to process, where to find
//! their input files and where to write the tables:
//!
//! ```json
//! {
//!   "input_template": "data/{area}/osisaf_{area}_{index}_daily.nc",
//!   "output_dir": "data/daily",
//!   "areas": ["nh", "sh"],
//!   "indices": ["sie", "sia"],
//!   "pipeline": { "reference_periods": [[1981, 2010]], "exclusions": { "years": [1978] } }
//! }
//! ```

use crate::errors::Result;
use crate::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Input path with `{area}` and `{index}` placeholders
    pub input_template: String,
    /// Root directory for the output tables
    pub output_dir: PathBuf,
    #[serde(default = "default_areas")]
    pub areas: Vec<String>,
    /// Index variable names
    #[serde(default = "default_indices")]
    pub indices: Vec<String>,
    /// Worker threads; all cores when unset
    #[serde(default)]
    pub threads: Option<usize>,
    /// Also write `{area}/{index}_statistics.nc`
    #[serde(default)]
    pub write_netcdf: bool,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_areas() -> Vec<String> {
    [
        "glb", "nh", "sh", "bar", "beau", "chuk", "ess", "fram", "kara", "lap", "sval", "bell",
        "drml", "indi", "ross", "trol", "wedd", "wpac",
    ]
    .map(String::from)
    .to_vec()
}

fn default_indices() -> Vec<String> {
    vec!["sie".to_string(), "sia".to_string()]
}

/// One (area, index) combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub area: String,
    pub index: String,
    pub input: PathBuf,
}

impl BatchConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// I/O errors and JSON errors, including unknown fields.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// # Errors
    ///
    /// JSON errors, including unknown fields.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// All jobs, areas outermost
    pub fn jobs(&self) -> Vec<BatchJob> {
        self.areas
            .iter()
            .flat_map(|area| {
                self.indices.iter().map(move |index| BatchJob {
                    area: area.clone(),
                    index: index.clone(),
                    input: PathBuf::from(
                        self.input_template
                            .replace("{area}", area)
                            .replace("{index}", index),
                    ),
                })
            })
            .collect()
    }
}
