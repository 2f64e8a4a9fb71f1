// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Engine-level configuration (§6): the CLI/config-file surface a host
//! loads before constructing a [`PowMode`], mirroring the demo binary's own
//! `toml`-backed `DemoConfig` layering one level up the stack.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ubqhash_pow::{NullOracle, PowMode, PowOracle};

/// Which seal-verification strategy to run, as a config-file-friendly tag.
/// Mirrors [`PowMode`]'s variants minus the oracle handles, which can't
/// cross a (de)serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowModeKind {
	/// Real oracle, fully armed.
	Normal,
	/// Real oracle, shared with another engine instance.
	Shared,
	/// Real oracle forced to a tiny cache, for fast tests.
	Test,
	/// No real oracle; sleeps `fake_delay_ms` and can be made to fail at
	/// `fake_fail_at`.
	Fake,
	/// No real oracle, no delay, never fails.
	FullFake,
}

impl Default for PowModeKind {
	fn default() -> Self {
		PowModeKind::FullFake
	}
}

/// The CLI/config-file surface of §6: which PoW mode to run, the `Fake`
/// mode's timing/failure knobs, the PoW epoch length, and where a real
/// oracle implementation should look for its cache/dataset files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Seal-verification strategy to construct.
	pub pow_mode: PowModeKind,
	/// `Fake` mode's artificial per-seal delay, in milliseconds.
	pub fake_delay_ms: u64,
	/// `Fake` mode's configured failure height, if any.
	pub fake_fail_at: Option<u64>,
	/// Number of blocks per PoW cache/dataset epoch.
	pub epoch_length: u64,
	/// Directory a real oracle should use for light caches.
	pub cache_dir: PathBuf,
	/// Directory a real oracle should use for full datasets.
	pub dataset_dir: PathBuf,
}

impl Default for EngineConfig {
	fn default() -> Self {
		EngineConfig {
			pow_mode: PowModeKind::default(),
			fake_delay_ms: 0,
			fake_fail_at: None,
			epoch_length: ubqhash_types::constants::EPOCH_LENGTH,
			cache_dir: PathBuf::from("ubqhash/cache"),
			dataset_dir: PathBuf::from("ubqhash/dataset"),
		}
	}
}

impl EngineConfig {
	/// Load configuration from a TOML file at `path`, falling back to
	/// `Default` for any field the file omits.
	pub fn load(path: &str) -> Result<Self, String> {
		let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
		toml::from_str(&contents).map_err(|e| e.to_string())
	}

	/// Build the runtime [`PowMode`] this config describes.
	///
	/// `Normal` and `Shared` need a real oracle backed by `cache_dir`/
	/// `dataset_dir`; real dataset construction is out of scope for this
	/// engine (see `ubqhash_pow::oracle`), so those two variants take the
	/// caller-supplied oracle rather than building one from the paths above.
	pub fn pow_mode(&self, real_oracle: impl FnOnce() -> Arc<dyn PowOracle>) -> PowMode {
		match self.pow_mode {
			PowModeKind::Normal => PowMode::Normal(real_oracle()),
			PowModeKind::Shared => PowMode::Shared(real_oracle()),
			PowModeKind::Test => PowMode::Test(Arc::new(NullOracle::tiny())),
			PowModeKind::Fake => PowMode::Fake {
				delay: Duration::from_millis(self.fake_delay_ms),
				fail_at: self.fake_fail_at,
			},
			PowModeKind::FullFake => PowMode::FullFake,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_full_fake_with_standard_epoch() {
		let config = EngineConfig::default();
		assert_eq!(config.pow_mode, PowModeKind::FullFake);
		assert_eq!(config.epoch_length, 30_000);
		assert!(matches!(config.pow_mode(|| unreachable!()), PowMode::FullFake));
	}

	#[test]
	fn fake_mode_carries_delay_and_fail_at_into_pow_mode() {
		let config = EngineConfig {
			pow_mode: PowModeKind::Fake,
			fake_delay_ms: 5,
			fake_fail_at: Some(42),
			..EngineConfig::default()
		};
		match config.pow_mode(|| unreachable!()) {
			PowMode::Fake { delay, fail_at } => {
				assert_eq!(delay, Duration::from_millis(5));
				assert_eq!(fail_at, Some(42));
			}
			_ => panic!("expected PowMode::Fake"),
		}
	}

	#[test]
	fn test_mode_builds_a_tiny_null_oracle_without_calling_real_oracle() {
		let config = EngineConfig {
			pow_mode: PowModeKind::Test,
			..EngineConfig::default()
		};
		assert!(matches!(config.pow_mode(|| unreachable!()), PowMode::Test(_)));
	}

	#[test]
	fn deserializes_from_toml() {
		let toml = r#"
			pow_mode = "fake"
			fake_delay_ms = 10
			fake_fail_at = 7
			epoch_length = 1000
			cache_dir = "/tmp/cache"
			dataset_dir = "/tmp/dataset"
		"#;
		let config: EngineConfig = toml::from_str(toml).unwrap();
		assert_eq!(config.pow_mode, PowModeKind::Fake);
		assert_eq!(config.fake_delay_ms, 10);
		assert_eq!(config.fake_fail_at, Some(7));
		assert_eq!(config.epoch_length, 1000);
		assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
	}

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let config: EngineConfig = toml::from_str("pow_mode = \"test\"").unwrap();
		assert_eq!(config.pow_mode, PowModeKind::Test);
		assert_eq!(config.epoch_length, 30_000);
	}
}
