// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! A minimal host: an in-memory `ChainReader`, a handful of chained
//! headers, and a single run through `HeaderVerifier`. Exists to exercise
//! the engine end-to-end, not as a real node.

mod config;
mod memory_chain;

use std::sync::Arc;

use log::info;
use ubqhash_consensus::HeaderVerifier;
use ubqhash_pow::{NullOracle, PowMode};
use ubqhash_types::HeaderBuilder;

use crate::config::DemoConfig;
use crate::memory_chain::MemoryChain;

fn main() {
	env_logger::init();

	let config_path = std::env::args().nth(1);
	let config = config_path
		.map(|path| DemoConfig::load(&path).expect("failed to load config"))
		.unwrap_or_default();
	info!("starting ubqhash-demo with {} synthetic blocks", config.block_count);

	let chain = Arc::new(MemoryChain::new(config.chain_config()));
	let genesis = HeaderBuilder::default()
		.number(0)
		.timestamp(1_600_000_000)
		.difficulty(ubqhash_types::U256::from(ubqhash_types::constants::MIN_DIFFICULTY))
		.gas_limit(8_000_000)
		.build();
	chain.insert(genesis.clone());

	let mode = PowMode::Test(Arc::new(NullOracle::tiny()));
	let verifier = HeaderVerifier::new(Arc::clone(&chain), mode);

	let mut parent = genesis;
	let mut headers = Vec::with_capacity(config.block_count as usize);
	for i in 1..=config.block_count {
		let child = HeaderBuilder::default()
			.number(i)
			.parent_hash(parent.hash())
			.timestamp(parent.timestamp() + 22)
			.difficulty(parent.difficulty())
			.gas_limit(parent.gas_limit())
			.build();
		chain.insert(child.clone());
		headers.push(child.clone());
		parent = child;
	}

	let seals = vec![false; headers.len()];
	let (_abort_tx, abort_rx) = crossbeam_channel::bounded::<()>(0);
	let results = verifier.verify_batch(&headers, &seals, abort_rx);

	let ok = results.iter().filter(|r| r.is_ok()).count();
	info!("verified {}/{} headers successfully", ok, headers.len());
	for (idx, result) in results.iter().enumerate() {
		if let Err(e) = result {
			info!("header {} rejected: {}", idx, e);
		}
	}
}
