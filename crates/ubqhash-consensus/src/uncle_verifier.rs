// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Uncle validation (§4.3): a 7-ancestor scan collecting seen uncle hashes,
//! then per-uncle duplicate/ancestry/recency checks.

use std::collections::{HashMap, HashSet};

use ubqhash_types::{constants, Block, ChainReader, ConsensusError, Hash, Header};

use crate::header_verifier::HeaderVerifier;

/// Validates a block's declared uncles against its recent ancestry.
pub struct UncleVerifier<'a, C: ChainReader> {
	header_verifier: &'a HeaderVerifier<C>,
	chain: &'a C,
}

impl<'a, C: ChainReader> UncleVerifier<'a, C> {
	/// Build an uncle verifier sharing `header_verifier`'s chain/mode.
	pub fn new(header_verifier: &'a HeaderVerifier<C>, chain: &'a C) -> Self {
		UncleVerifier {
			header_verifier,
			chain,
		}
	}

	/// Verify `block`'s uncles against its parent's 7-deep ancestry.
	pub fn verify_uncles(&self, block: &Block) -> Result<(), ConsensusError> {
		if block.uncles().len() > constants::MAX_UNCLES {
			return Err(ConsensusError::TooManyUncles {
				found: block.uncles().len(),
				max: constants::MAX_UNCLES,
			});
		}
		if block.uncles().is_empty() {
			return Ok(());
		}

		let header = block.header();
		let mut ancestors: HashMap<Hash, Header> = HashMap::new();
		let mut seen_uncles: HashSet<Hash> = HashSet::new();

		// Walk back exactly 7 ancestors, each contributing one entry to
		// `ancestors` and its own declared uncles to `seen_uncles`; a missing
		// ancestor just ends the walk early rather than failing verification.
		let mut cursor_hash = header.parent_hash();
		let mut cursor_number = header.number().saturating_sub(1);
		for _ in 0..constants::UNCLE_ANCESTRY_DEPTH {
			let ancestor = match self.chain.get_block(cursor_hash, cursor_number) {
				Some(ancestor) => ancestor,
				None => break,
			};
			ancestors.insert(ancestor.header().hash(), ancestor.header().clone());
			for uncle in ancestor.uncles() {
				seen_uncles.insert(uncle.hash());
			}
			cursor_hash = ancestor.header().parent_hash();
			cursor_number = cursor_number.saturating_sub(1);
		}

		// The block itself is a valid uncle parent and a forbidden uncle hash,
		// but never counts as one of the 7 scanned ancestors above.
		ancestors.insert(header.hash(), header.clone());
		seen_uncles.insert(header.hash());

		for uncle in block.uncles() {
			let uncle_hash = uncle.hash();

			if seen_uncles.contains(&uncle_hash) {
				return Err(ConsensusError::DuplicateUncle);
			}
			if ancestors.contains_key(&uncle_hash) {
				return Err(ConsensusError::UncleIsAncestor);
			}
			if uncle.parent_hash() == header.parent_hash() {
				return Err(ConsensusError::DanglingUncle);
			}
			let uncle_parent = match ancestors.get(&uncle.parent_hash()) {
				Some(parent) => parent.clone(),
				None => return Err(ConsensusError::DanglingUncle),
			};

			self.header_verifier
				.verify_header(uncle, &uncle_parent, true, true)?;

			seen_uncles.insert(uncle_hash);
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap as StdHashMap;
	use std::sync::Arc;
	use ubqhash_pow::PowMode;
	use ubqhash_types::{BlockNumber, ChainConfig, HeaderBuilder};

	struct MapChain {
		headers: StdHashMap<Hash, Header>,
		blocks: StdHashMap<Hash, Block>,
	}

	impl ChainReader for MapChain {
		fn get_header(&self, hash: Hash, _number: BlockNumber) -> Option<Header> {
			self.headers.get(&hash).cloned()
		}
		fn get_block(&self, hash: Hash, _number: BlockNumber) -> Option<Block> {
			self.blocks.get(&hash).cloned()
		}
		fn median_time(&self, block_number: BlockNumber, _parent: &Header) -> u64 {
			block_number * 22
		}
		fn config(&self) -> ChainConfig {
			ChainConfig::default()
		}
	}

	#[test]
	fn too_many_uncles_rejected() {
		let header = HeaderBuilder::default().number(10).build();
		let uncles = vec![
			HeaderBuilder::default().number(9).build(),
			HeaderBuilder::default().number(9).timestamp(1).build(),
			HeaderBuilder::default().number(9).timestamp(2).build(),
		];
		let block = Block::new(header, uncles, vec![], vec![]);

		let chain = MapChain {
			headers: StdHashMap::new(),
			blocks: StdHashMap::new(),
		};
		let hv = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let chain_ref = MapChain {
			headers: StdHashMap::new(),
			blocks: StdHashMap::new(),
		};
		let uv = UncleVerifier::new(&hv, &chain_ref);
		assert_eq!(
			uv.verify_uncles(&block),
			Err(ConsensusError::TooManyUncles { found: 3, max: 2 })
		);
	}

	#[test]
	fn uncle_whose_parent_is_the_eighth_ancestor_is_dangling() {
		// Build a chain of 8 ancestors behind `header`; the scan only walks
		// back 7, so the 8th (`gen8`, the oldest) must never land in
		// `ancestors` and an uncle parented on it must be rejected.
		let gen8 = HeaderBuilder::default().number(1).build();
		let gen7 = HeaderBuilder::default().number(2).parent_hash(gen8.hash()).build();
		let gen6 = HeaderBuilder::default().number(3).parent_hash(gen7.hash()).build();
		let gen5 = HeaderBuilder::default().number(4).parent_hash(gen6.hash()).build();
		let gen4 = HeaderBuilder::default().number(5).parent_hash(gen5.hash()).build();
		let gen3 = HeaderBuilder::default().number(6).parent_hash(gen4.hash()).build();
		let gen2 = HeaderBuilder::default().number(7).parent_hash(gen3.hash()).build();
		let gen1 = HeaderBuilder::default().number(8).parent_hash(gen2.hash()).build();
		let header = HeaderBuilder::default().number(9).parent_hash(gen1.hash()).build();

		let mut blocks = StdHashMap::new();
		for ancestor in [&gen1, &gen2, &gen3, &gen4, &gen5, &gen6, &gen7] {
			blocks.insert(ancestor.hash(), Block::new(ancestor.clone(), vec![], vec![], vec![]));
		}

		let uncle = HeaderBuilder::default()
			.number(9)
			.parent_hash(gen8.hash())
			.timestamp(1)
			.build();
		let block = Block::new(header, vec![uncle], vec![], vec![]);

		let hv_chain = MapChain {
			headers: StdHashMap::new(),
			blocks: blocks.clone(),
		};
		let hv = HeaderVerifier::new(Arc::new(hv_chain), PowMode::FullFake);
		let chain_ref = MapChain {
			headers: StdHashMap::new(),
			blocks,
		};
		let uv = UncleVerifier::new(&hv, &chain_ref);
		assert_eq!(uv.verify_uncles(&block), Err(ConsensusError::DanglingUncle));
	}

	#[test]
	fn no_uncles_is_trivially_ok() {
		let header = HeaderBuilder::default().number(10).build();
		let block = Block::new(header, vec![], vec![], vec![]);
		let chain = MapChain {
			headers: StdHashMap::new(),
			blocks: StdHashMap::new(),
		};
		let hv = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let chain_ref = MapChain {
			headers: StdHashMap::new(),
			blocks: StdHashMap::new(),
		};
		let uv = UncleVerifier::new(&hv, &chain_ref);
		assert!(uv.verify_uncles(&block).is_ok());
	}
}
