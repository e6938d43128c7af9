use crate::config::{DatasetConfig, Interpolation, Phase, TestConfig};
use crate::constants::{loader, model, store};
use crate::error::{Result, Sr3dError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Options file for a test run, loadable from TOML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOptionsFile {
    /// Appended to every rendered sample file name (optional)
    #[serde(default)]
    pub suffix: Option<String>,

    /// Output locations
    #[serde(default)]
    pub run: RunSection,

    /// Built-in model settings
    #[serde(default)]
    pub model: ModelSection,

    /// Prediction store layout
    #[serde(default)]
    pub output: OutputSection,

    /// Datasets to test, run in key order
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Root directory for per-dataset results (default: "./results")
    pub results_root: PathBuf,

    /// Directory for test.log (optional, screen only when absent)
    pub log_dir: Option<PathBuf>,

    /// Show a progress bar over batches (default: true)
    pub show_progress: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from("./results"),
            log_dir: None,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Upscaling factor (default: 4)
    pub scale: usize,

    /// "nearest" or "trilinear" (default: "trilinear")
    pub interpolation: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            scale: model::DEFAULT_SCALE,
            interpolation: "trilinear".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Per-sample volume shape D, H, W, C (default: [40, 40, 40, 3])
    pub volume_shape: [usize; 4],
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            volume_shape: store::DEFAULT_VOLUME_SHAPE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    /// Dataset name, also the results subdirectory
    pub name: String,

    /// LR HDF5 file (required)
    pub dataroot_lr: Option<PathBuf>,

    /// HR HDF5 file (optional, enables metrics)
    pub dataroot_hr: Option<PathBuf>,

    /// "train" or "test" (default: "test")
    pub phase: String,

    /// Random horizontal flip in train phase (default: false)
    pub use_flip: bool,

    /// Random vertical flip and 90-degree rotation in train phase (default: false)
    pub use_rot: bool,

    /// LR crop size, used to pick the rendered slice (default: 10)
    pub lr_size: usize,

    /// Samples per batch (default: 1)
    pub batch_size: usize,

    /// Shuffle sample order (default: false)
    pub shuffle: bool,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            name: String::new(),
            dataroot_lr: None,
            dataroot_hr: None,
            phase: "test".to_string(),
            use_flip: false,
            use_rot: false,
            lr_size: loader::DEFAULT_LR_SIZE,
            batch_size: loader::DEFAULT_BATCH_SIZE,
            shuffle: false,
        }
    }
}

impl DatasetSection {
    fn to_dataset_config(&self, key: &str) -> Result<DatasetConfig> {
        let dataroot_lr = self.dataroot_lr.clone().ok_or_else(|| {
            Sr3dError::InvalidParameter(format!("Dataset '{}' is missing dataroot_lr", key))
        })?;
        let name = if self.name.is_empty() { key.to_string() } else { self.name.clone() };

        Ok(DatasetConfig {
            name,
            dataroot_lr,
            dataroot_hr: self.dataroot_hr.clone(),
            phase: Phase::from_str(&self.phase)?,
            use_flip: self.use_flip,
            use_rot: self.use_rot,
            lr_size: self.lr_size,
            batch_size: self.batch_size,
            shuffle: self.shuffle,
        })
    }
}

impl TestOptionsFile {
    /// Load options, picking the format from the file extension (JSON for `.json`, TOML otherwise)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Sr3dError::FileNotFound(path.to_path_buf()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Load options from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Sr3dError::Parse(format!("Failed to parse TOML options: {}", e)))
    }

    /// Load options from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Sr3dError::Parse(format!("Failed to parse JSON options: {}", e)))
    }

    /// Save options to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Sr3dError::Serialization(format!("Failed to serialize to TOML: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Save options to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Sr3dError::Serialization(format!("Failed to serialize to JSON: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Convert to a validated TestConfig
    pub fn to_test_config(&self) -> Result<TestConfig> {
        let datasets = self
            .datasets
            .iter()
            .map(|(key, section)| section.to_dataset_config(key))
            .collect::<Result<Vec<_>>>()?;

        let config = TestConfig {
            results_root: self.run.results_root.clone(),
            log_dir: self.run.log_dir.clone(),
            suffix: self.suffix.clone().filter(|s| !s.is_empty()),
            scale: self.model.scale,
            interpolation: Interpolation::from_str(&self.model.interpolation)?,
            volume_shape: self.output.volume_shape,
            show_progress: self.run.show_progress,
            datasets,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default options with a single test dataset
    pub fn generate_default() -> Self {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "test_1".to_string(),
            DatasetSection {
                name: "test_1".to_string(),
                dataroot_lr: Some(PathBuf::from("./data/test_LR.h5")),
                dataroot_hr: Some(PathBuf::from("./data/test_HR.h5")),
                ..DatasetSection::default()
            },
        );
        Self {
            suffix: None,
            run: RunSection::default(),
            model: ModelSection::default(),
            output: OutputSection::default(),
            datasets,
        }
    }

    /// Create an example options file with comments
    pub fn create_example_toml() -> String {
        r#"# sr3d test options
# Appended to every rendered sample file name
# suffix = "_rrdb"

[run]
# Per-dataset results land in <results_root>/<dataset name>/
results_root = "./results"

# Write test.log here as well as to the screen
# log_dir = "./logs"

show_progress = true

[model]
# Upscaling factor between LR and SR volumes
scale = 4

# "nearest" or "trilinear"
interpolation = "trilinear"

[output]
# Shape of each volume in <name>_CNNPredict.h5 (D, H, W, C)
volume_shape = [40, 40, 40, 3]

# One table per dataset; tables run in key order
[datasets.test_1]
name = "test_1"
dataroot_lr = "./data/test_LR.h5"

# Leave out to skip metrics
dataroot_hr = "./data/test_HR.h5"

phase = "test"
use_flip = false
use_rot = false
lr_size = 10
batch_size = 1
shuffle = false
"#
        .to_string()
    }
}
