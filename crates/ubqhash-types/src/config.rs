// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The `ChainConfig` collaborator: the subset of chain parameters the
//! engine needs from its host but does not own itself (fork-activation
//! numbers, the penalty-system activation height). Everything here is
//! "inherited from the parameter collaborator" per spec §6.

use serde::{Deserialize, Serialize};

use crate::{constants, header::BlockNumber, U256};

/// Chain parameters supplied by the host node, analogous to
/// `consensus.ChainReader.Config()` in the reference implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
	/// Maximum size, in bytes, of a header's `extra` field.
	pub max_extra_size: usize,
	/// Minimum allowed block gas limit.
	pub min_gas_limit: u64,
	/// Divisor bounding gas-limit drift between parent and child.
	pub gas_limit_bound_divisor: u64,
	/// Difficulty floor applied by the V2 and Flux regimes.
	pub min_difficulty: U256,
	/// Block number beyond which the penalty system is armed. Below this
	/// height the chain is assumed still establishing itself and delayed
	/// batches are not rejected.
	pub penalty_activation: BlockNumber,
	/// Number of blocks per PoW cache/dataset epoch.
	pub epoch_length: u64,
}

impl Default for ChainConfig {
	fn default() -> Self {
		ChainConfig {
			max_extra_size: constants::MAX_EXTRA_SIZE,
			min_gas_limit: constants::MIN_GAS_LIMIT,
			gas_limit_bound_divisor: constants::GAS_LIMIT_BOUND_DIVISOR,
			min_difficulty: U256::from(constants::MIN_DIFFICULTY),
			penalty_activation: 0,
			epoch_length: constants::EPOCH_LENGTH,
		}
	}
}
