//! Optional TOML overrides for training hyperparameters.
//!
//! A `train_options.toml` in the app root tweaks the defaults without code
//! changes; a missing or unparsable file silently keeps the defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::app_dirs;
use crate::ml::gbdt_stump::StumpTrainOptions;
use crate::training::TrainRunOptions;

/// File name of the optional override file in the app root.
pub const TRAIN_OPTIONS_FILE_NAME: &str = "train_options.toml";

/// Parsed override file; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainOptionsToml {
    /// Cross-validation folds for the meta-feature pass.
    #[serde(default)]
    pub folds: Option<usize>,
    /// Seed shared by the split and the ensemble trainers.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Held-out fraction of rows.
    #[serde(default)]
    pub test_fraction: Option<f32>,
    /// Meta-learner epochs.
    #[serde(default)]
    pub meta_epochs: Option<usize>,
    /// Meta-learner learning rate.
    #[serde(default)]
    pub meta_learning_rate: Option<f32>,
    /// Boosting rounds, one entry per base learner.
    #[serde(default)]
    pub base_rounds: Option<Vec<usize>>,
    /// Learning rate applied to every base learner.
    #[serde(default)]
    pub base_learning_rate: Option<f32>,
}

impl TrainOptionsToml {
    /// Merge the overrides into the default training options.
    pub fn apply(&self) -> TrainRunOptions {
        let mut options = TrainRunOptions::default();
        if let Some(folds) = self.folds {
            options.stacking.folds = folds;
        }
        if let Some(seed) = self.seed {
            options.stacking.seed = seed;
            options.stacking.meta.seed = seed;
            options.split_seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            options.test_fraction = fraction;
        }
        if let Some(epochs) = self.meta_epochs {
            options.stacking.meta.epochs = epochs;
        }
        if let Some(rate) = self.meta_learning_rate {
            options.stacking.meta.learning_rate = rate;
        }
        if let Some(rounds) = &self.base_rounds {
            options.stacking.bases = rounds
                .iter()
                .map(|&rounds| StumpTrainOptions {
                    rounds,
                    ..StumpTrainOptions::default()
                })
                .collect();
        }
        if let Some(rate) = self.base_learning_rate {
            for base in &mut options.stacking.bases {
                base.learning_rate = rate;
            }
        }
        options
    }
}

/// Path of the override file inside the app root, if the root resolves.
pub fn train_options_path() -> Option<PathBuf> {
    let dir = app_dirs::app_root_dir().ok()?;
    Some(dir.join(TRAIN_OPTIONS_FILE_NAME))
}

/// Load overrides from the app root; `None` when absent or invalid.
pub fn load_from_app_dir() -> Option<TrainOptionsToml> {
    let path = train_options_path()?;
    let text = std::fs::read_to_string(path).ok()?;
    toml::from_str::<TrainOptionsToml>(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_land_in_the_right_places() {
        let parsed: TrainOptionsToml = toml::from_str(
            "seed = 9\nfolds = 3\nbase_rounds = [50, 25, 10]\nbase_learning_rate = 0.2\n",
        )
        .unwrap();
        let options = parsed.apply();
        assert_eq!(options.split_seed, 9);
        assert_eq!(options.stacking.folds, 3);
        assert_eq!(options.stacking.bases.len(), 3);
        assert!(options.stacking.bases.iter().all(|b| b.learning_rate == 0.2));
        assert_eq!(options.test_fraction, TrainRunOptions::default().test_fraction);
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let parsed: TrainOptionsToml = toml::from_str("").unwrap();
        let options = parsed.apply();
        let defaults = TrainRunOptions::default();
        assert_eq!(options.stacking.bases.len(), defaults.stacking.bases.len());
        assert_eq!(options.split_seed, defaults.split_seed);
    }
}
