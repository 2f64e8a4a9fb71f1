// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! A toy, in-memory `ChainReader`: everything lives in a `Mutex<HashMap>`.
//! Stands in for a real database-backed chain store, which is out of this
//! engine's scope.

use std::collections::HashMap;

use parking_lot::Mutex;
use ubqhash_types::{BlockNumber, Block, ChainConfig, ChainReader, Hash, Header};

/// An in-memory header/block store, keyed by hash.
pub struct MemoryChain {
	config: ChainConfig,
	headers: Mutex<HashMap<Hash, Header>>,
}

impl MemoryChain {
	/// Build an empty chain under `config`.
	pub fn new(config: ChainConfig) -> Self {
		MemoryChain {
			config,
			headers: Mutex::new(HashMap::new()),
		}
	}

	/// Insert `header`, keyed by its own hash.
	pub fn insert(&self, header: Header) {
		self.headers.lock().insert(header.hash(), header);
	}
}

impl ChainReader for MemoryChain {
	fn get_header(&self, hash: Hash, _number: BlockNumber) -> Option<Header> {
		self.headers.lock().get(&hash).cloned()
	}

	fn get_block(&self, _hash: Hash, _number: BlockNumber) -> Option<Block> {
		None
	}

	fn median_time(&self, block_number: BlockNumber, reference_header: &Header) -> u64 {
		// A toy host has no ancestor-timestamp history beyond the parent it
		// was handed; approximate the window with the reference header's own
		// timestamp offset by the block gap. Real hosts walk actual ancestry.
		let gap = reference_header.number().saturating_sub(block_number);
		reference_header.timestamp().saturating_sub(gap * 22)
	}

	fn config(&self) -> ChainConfig {
		self.config.clone()
	}
}
