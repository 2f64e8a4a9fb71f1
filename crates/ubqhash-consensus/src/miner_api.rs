// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The `MinerAPI` core (§4.7): request/reply channels bound to the engine,
//! gated by [`PowMode`] and fast-failing against an exit signal.
//!
//! This module implements the channel plumbing and bookkeeping; the
//! JSON-RPC-shaped method names (`GetWork`, `SubmitWork`, ...) are exposed
//! by `ubqhash-rpc`, which calls straight through to this type.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use ubqhash_pow::{verify_seal, PowMode};
use ubqhash_types::{ConsensusError, Hash, Header, U256};

/// A work package: the 4-tuple of 32-byte words handed to remote miners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPackage {
	/// The seal hash the miner should search nonces against.
	pub seal_hash: Hash,
	/// The seed hash identifying the epoch's dataset.
	pub seed_hash: Hash,
	/// The PoW boundary (target) for this work.
	pub boundary: Hash,
	/// The block number this work package is for.
	pub block_number: u64,
}

/// Fires once when the engine is shutting down; every in-flight and future
/// `MinerApi` call observes it and fails fast with `EngineStopped`.
#[derive(Clone)]
pub struct ExitSignal {
	rx: crossbeam_channel::Receiver<()>,
}

impl ExitSignal {
	/// Build a paired `(ExitSignal, closer)`: dropping or invoking the
	/// closer fires the signal for every clone of the `ExitSignal`.
	pub fn new() -> (Self, crossbeam_channel::Sender<()>) {
		let (tx, rx) = crossbeam_channel::bounded(0);
		(ExitSignal { rx }, tx)
	}

	fn fired(&self) -> bool {
		matches!(self.rx.try_recv(), Err(crossbeam_channel::TryRecvError::Disconnected))
	}
}

/// The engine-side core of the miner API: current work, hash-rate
/// bookkeeping, and the PoW-mode gate.
pub struct MinerApi {
	mode: PowMode,
	exit: ExitSignal,
	current_work: Mutex<Option<(Header, WorkPackage)>>,
	hashrates: Mutex<HashMap<String, u64>>,
}

impl MinerApi {
	/// Build a miner API bound to `mode`, observing `exit` for shutdown.
	pub fn new(mode: PowMode, exit: ExitSignal) -> Self {
		MinerApi {
			mode,
			exit,
			current_work: Mutex::new(None),
			hashrates: Mutex::new(HashMap::new()),
		}
	}

	fn require_supported(&self) -> Result<(), ConsensusError> {
		if self.exit.fired() {
			return Err(ConsensusError::EngineStopped);
		}
		if !self.mode.accepts_miner_api() {
			return Err(ConsensusError::NotSupported);
		}
		Ok(())
	}

	/// Publish a new unsealed work package, replacing whatever was current.
	pub fn set_work(&self, header: Header, seed_hash: Hash) {
		let boundary = ubqhash_pow::difficulty_to_target(header.difficulty());
		let mut boundary_bytes = [0u8; 32];
		boundary.to_big_endian(&mut boundary_bytes);
		let package = WorkPackage {
			seal_hash: header.seal_hash(),
			seed_hash,
			boundary: Hash::from(boundary_bytes),
			block_number: header.number(),
		};
		*self.current_work.lock() = Some((header, package));
	}

	/// `GetWork` (§6): fetch the current work package.
	pub fn fetch_work(&self) -> Result<WorkPackage, ConsensusError> {
		self.require_supported()?;
		self.current_work
			.lock()
			.as_ref()
			.map(|(_, package)| *package)
			.ok_or(ConsensusError::NotSupported)
	}

	/// `SubmitWork` (§6): re-run §4.4 with the submitted seal; `Ok(true)`
	/// iff it is accepted as valid for the currently published header.
	pub fn submit_work(&self, nonce: [u8; 8], seal_hash: Hash, mix_digest: Hash) -> Result<bool, ConsensusError> {
		self.require_supported()?;

		let header = {
			let guard = self.current_work.lock();
			match guard.as_ref() {
				Some((header, package)) if package.seal_hash == seal_hash => {
					ubqhash_types::HeaderBuilder::default()
						.number(header.number())
						.parent_hash(header.parent_hash())
						.uncle_hash(header.uncle_hash())
						.coinbase(header.coinbase())
						.state_root(header.state_root())
						.tx_root(header.tx_root())
						.receipt_root(header.receipt_root())
						.bloom(*header.bloom())
						.difficulty(header.difficulty())
						.gas_limit(header.gas_limit())
						.gas_used(header.gas_used())
						.timestamp(header.timestamp())
						.extra(header.extra().to_vec())
						.mix_digest(mix_digest)
						.nonce(nonce)
						.build()
				}
				_ => return Ok(false),
			}
		};

		match verify_seal(&self.mode, &header) {
			Ok(()) => Ok(true),
			Err(_) => Ok(false),
		}
	}

	/// `SubmitHashRate` (§6): record `rate` for remote `id`, aggregated
	/// across every remote for [`MinerApi::hashrate`].
	pub fn submit_hashrate(&self, id: String, rate: u64) -> Result<bool, ConsensusError> {
		self.require_supported()?;
		self.hashrates.lock().insert(id, rate);
		Ok(true)
	}

	/// `GetHashrate` (§6): the sum of every remote's last-reported rate.
	pub fn hashrate(&self) -> u64 {
		self.hashrates.lock().values().sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ubqhash_types::HeaderBuilder;

	#[test]
	fn fake_mode_rejects_all_miner_api_calls() {
		let (exit, _closer) = ExitSignal::new();
		let api = MinerApi::new(
			PowMode::Fake {
				delay: std::time::Duration::from_millis(0),
				fail_at: None,
			},
			exit,
		);
		assert_eq!(api.fetch_work(), Err(ConsensusError::NotSupported));
	}

	fn test_mode() -> PowMode {
		PowMode::Test(std::sync::Arc::new(ubqhash_pow::NullOracle::tiny()))
	}

	#[test]
	fn exit_signal_fast_fails_pending_requests() {
		let (exit, closer) = ExitSignal::new();
		let api = MinerApi::new(test_mode(), exit);
		drop(closer);
		assert_eq!(api.fetch_work(), Err(ConsensusError::EngineStopped));
	}

	#[test]
	fn hashrate_aggregates_across_remotes() {
		let (exit, _closer) = ExitSignal::new();
		let api = MinerApi::new(test_mode(), exit);
		api.submit_hashrate("a".into(), 100).unwrap();
		api.submit_hashrate("b".into(), 250).unwrap();
		assert_eq!(api.hashrate(), 350);
	}

	#[test]
	fn fetch_work_returns_published_package() {
		let (exit, _closer) = ExitSignal::new();
		let api = MinerApi::new(test_mode(), exit);
		let header = HeaderBuilder::default()
			.number(5)
			.difficulty(U256::from(131_072u64))
			.build();
		api.set_work(header.clone(), Hash::zero());
		let work = api.fetch_work().unwrap();
		assert_eq!(work.seal_hash, header.seal_hash());
		assert_eq!(work.block_number, 5);
	}
}
