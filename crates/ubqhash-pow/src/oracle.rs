// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The `PowOracle` collaborator: an abstract light-cache/full-dataset
//! provider. Concrete dataset/cache *construction* is explicitly out of
//! scope here (it's a large, orthogonal piece of ethash-family
//! implementations); this module specifies the trait boundary and the
//! epoch-keyed keep-alive discipline callers must honour.

use std::sync::Arc;

use ubqhash_types::{header::BlockNumber, Hash};

/// A PoW evaluation result: the mix digest and the raw result word, each 32
/// bytes, matching `PowOracle.evaluate` in §6.
pub type Evaluation = ([u8; 32], [u8; 32]);

/// Epoch index a block number belongs to.
pub fn epoch_of(number: BlockNumber, epoch_length: u64) -> u64 {
	number / epoch_length
}

/// Abstract provider of PoW evaluation, backed by either a light cache or a
/// full dataset depending on what the implementation has materialized for
/// the header's epoch.
///
/// Implementations must keep an epoch's cache/dataset alive for the
/// duration of any `evaluate` call that references it; the trait expresses
/// this as an `Arc`-held [`EpochLease`] rather than mandating a specific
/// locking strategy.
pub trait PowOracle: Send + Sync {
	/// Evaluate the PoW function for `(number, seal_hash, nonce)`, building
	/// or reusing whatever cache/dataset the header's epoch requires.
	fn evaluate(&self, number: BlockNumber, seal_hash: Hash, nonce: [u8; 8]) -> Evaluation;

	/// Size, in bytes, of the cache/dataset that backs `number`'s epoch.
	fn cache_size(&self, number: BlockNumber) -> usize;

	/// Acquire a lease that keeps `number`'s epoch cache alive for as long
	/// as the lease is held. Default implementation is a no-op lease for
	/// oracles that don't evict (e.g. test doubles).
	fn pin_epoch(&self, _number: BlockNumber) -> EpochLease {
		EpochLease(Arc::new(()))
	}
}

/// An opaque keep-alive token. Drop it to release the pin; while held, the
/// oracle promises not to evict the epoch's cache/dataset.
#[derive(Clone)]
pub struct EpochLease(Arc<dyn std::any::Any + Send + Sync>);

impl EpochLease {
	/// Wrap an arbitrary keep-alive payload (e.g. an `Arc<Dataset>`) as a lease.
	pub fn new<T: Send + Sync + 'static>(payload: Arc<T>) -> Self {
		EpochLease(payload)
	}
}

/// A deterministic stand-in oracle for `Test`/`FullFake`-style fixtures: it
/// derives a PoW-shaped result from `Keccak(seal_hash || nonce)` rather than
/// running the real cache/dataset algorithm, so tests get stable,
/// reproducible digests without constructing real epoch state.
pub struct NullOracle {
	cache_size: usize,
}

impl NullOracle {
	/// A null oracle reporting `cache_size` bytes for every epoch.
	pub fn new(cache_size: usize) -> Self {
		NullOracle { cache_size }
	}

	/// A null oracle with the `Test` mode's tiny 32 KiB cache size (§4.4).
	pub fn tiny() -> Self {
		NullOracle::new(32 * 1024)
	}
}

impl PowOracle for NullOracle {
	fn evaluate(&self, _number: BlockNumber, seal_hash: Hash, nonce: [u8; 8]) -> Evaluation {
		let mut preimage = Vec::with_capacity(40);
		preimage.extend_from_slice(seal_hash.as_bytes());
		preimage.extend_from_slice(&nonce);
		let digest = keccak_hash::keccak(&preimage);
		let result = keccak_hash::keccak(digest.as_bytes());
		(digest.to_fixed_bytes(), result.to_fixed_bytes())
	}

	fn cache_size(&self, _number: BlockNumber) -> usize {
		self.cache_size
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn null_oracle_is_deterministic() {
		let oracle = NullOracle::tiny();
		let seal_hash = Hash::from_low_u64_be(42);
		let a = oracle.evaluate(1, seal_hash, [0; 8]);
		let b = oracle.evaluate(1, seal_hash, [0; 8]);
		assert_eq!(a, b);
	}

	#[test]
	fn null_oracle_varies_with_nonce() {
		let oracle = NullOracle::tiny();
		let seal_hash = Hash::from_low_u64_be(42);
		let a = oracle.evaluate(1, seal_hash, [0; 8]);
		let b = oracle.evaluate(1, seal_hash, [1; 8]);
		assert_ne!(a, b);
	}

	#[test]
	fn epoch_of_divides_by_length() {
		assert_eq!(epoch_of(0, 30_000), 0);
		assert_eq!(epoch_of(29_999, 30_000), 0);
		assert_eq!(epoch_of(30_000, 30_000), 1);
	}
}
