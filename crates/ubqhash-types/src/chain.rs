// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The `ChainReader` collaborator (§6): the host's view of the chain that
//! the engine consults but does not own.

use crate::{header::BlockNumber, Block, ChainConfig, Hash, Header};

/// Host-provided chain access. The engine never mutates chain state through
/// this trait — it only reads headers, blocks and derived timestamps.
pub trait ChainReader: Send + Sync {
	/// Look up a header by hash and number, if known.
	fn get_header(&self, hash: Hash, number: BlockNumber) -> Option<Header>;

	/// Look up a full block by hash and number, if known.
	fn get_block(&self, hash: Hash, number: BlockNumber) -> Option<Block>;

	/// Median of the `MEDIAN_TIME_WINDOW` timestamps preceding
	/// `block_number`, walking back from `reference_header`.
	fn median_time(&self, block_number: BlockNumber, reference_header: &Header) -> u64;

	/// The chain's consensus parameters.
	fn config(&self) -> ChainConfig;
}
