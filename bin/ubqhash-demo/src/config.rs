// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Host-level demo configuration, loaded from an optional TOML file.
//! Mirrors the teacher's `toml`-backed config layer, scaled down to the
//! handful of knobs this demo host actually needs.

use serde::{Deserialize, Serialize};
use ubqhash_types::ChainConfig;

/// Demo-host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
	/// Number of synthetic blocks to build and verify.
	pub block_count: u64,
	/// Chain parameters handed to the `ChainReader`.
	pub chain: ChainConfig,
}

impl Default for DemoConfig {
	fn default() -> Self {
		DemoConfig {
			block_count: 10,
			chain: ChainConfig::default(),
		}
	}
}

impl DemoConfig {
	/// Load configuration from a TOML file at `path`.
	pub fn load(path: &str) -> Result<Self, String> {
		let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
		toml::from_str(&contents).map_err(|e| e.to_string())
	}

	/// The chain parameters this config carries, for wiring into a `ChainReader`.
	pub fn chain_config(&self) -> ChainConfig {
		self.chain.clone()
	}
}
