// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Delayed-chain detection (§4.6): a heuristic filter against long private
//! chain rewrites, plus the process-wide `BadHashes` set it writes to.
//!
//! `BadHashes` is modeled as a single-writer/multi-reader global, matching
//! the reference implementation's package-level set (§9 "Cyclic / global
//! state") — guarded here by a `parking_lot::RwLock` behind a
//! `lazy_static`, rather than threading a handle through every call site.

use std::collections::HashSet;

use lazy_static::lazy_static;
use log::{info, warn};
use parking_lot::RwLock;

use ubqhash_types::{constants, BlockNumber, ConsensusError, Hash};

lazy_static! {
	/// Process-wide set of hashes the penalty system has condemned.
	static ref BAD_HASHES: RwLock<HashSet<Hash>> = RwLock::new(HashSet::new());
}

/// Whether `hash` has previously been marked bad.
pub fn is_bad_hash(hash: Hash) -> bool {
	BAD_HASHES.read().contains(&hash)
}

/// Every hash currently marked bad. Intended for diagnostics; the hot path
/// is `is_bad_hash`.
pub fn bad_hashes_snapshot() -> HashSet<Hash> {
	BAD_HASHES.read().clone()
}

fn mark_bad_hash(hash: Hash) {
	BAD_HASHES.write().insert(hash);
}

/// Running metrics mirroring `penaltysystem.go`'s `blockDelayedMeter` /
/// `blockPenaltyMeter`, kept as simple atomics rather than a full metrics
/// registry (this engine doesn't own one — see SPEC_FULL.md's ambient
/// stack notes).
#[derive(Debug, Default)]
pub struct PenaltyMetrics {
	delayed_blocks: std::sync::atomic::AtomicU64,
	penalty_score: std::sync::atomic::AtomicU64,
}

impl PenaltyMetrics {
	/// Total delayed blocks observed across every batch.
	pub fn delayed_blocks(&self) -> u64 {
		self.delayed_blocks.load(std::sync::atomic::Ordering::Relaxed)
	}
	/// Total penalty score accumulated across every batch.
	pub fn penalty_score(&self) -> u64 {
		self.penalty_score.load(std::sync::atomic::Ordering::Relaxed)
	}
}

/// Heuristic 51%-style rewrite detector.
pub struct PenaltySystem {
	metrics: PenaltyMetrics,
}

impl Default for PenaltySystem {
	fn default() -> Self {
		PenaltySystem {
			metrics: PenaltyMetrics::default(),
		}
	}
}

impl PenaltySystem {
	/// Running delayed-block/penalty-score metrics.
	pub fn metrics(&self) -> &PenaltyMetrics {
		&self.metrics
	}

	/// Check an incoming batch of block numbers against `current_tip`.
	///
	/// `is_synced` gates the whole check: the reference implementation only
	/// scores delayed chains once the node's fast-sync head has caught up to
	/// its full-block head, and skips it entirely otherwise (a node still
	/// catching up naturally imports batches trailing far behind its
	/// eventual tip, which isn't evidence of a rewrite). `logonly` suppresses
	/// the reject-and-mark behaviour (metrics still update) for callers that
	/// only want visibility; `reverse` indicates the batch is already
	/// oldest-first (as opposed to newest-first) so the tip-distance
	/// bookkeeping reads the right end of the slice.
	pub fn check_delayed_chain(
		&self,
		is_synced: bool,
		current_tip: BlockNumber,
		penalty_activation: BlockNumber,
		batch: &[(Hash, BlockNumber)],
		logonly: bool,
		reverse: bool,
	) -> Result<(), ConsensusError> {
		if !is_synced || current_tip < penalty_activation || batch.is_empty() {
			return Ok(());
		}

		let batch_tip_number = if reverse {
			batch.first().map(|(_, n)| *n)
		} else {
			batch.last().map(|(_, n)| *n)
		}
		.unwrap_or(current_tip);

		if current_tip.saturating_sub(batch_tip_number) <= constants::DELAYED_INFO_LEN {
			return Ok(());
		}

		let score: u64 = batch
			.iter()
			.map(|(_, number)| current_tip.saturating_sub(*number))
			.sum();
		let delayed = batch
			.iter()
			.filter(|(_, number)| current_tip >= *number)
			.count() as u64;

		self.metrics
			.delayed_blocks
			.fetch_add(delayed, std::sync::atomic::Ordering::Relaxed);
		self.metrics
			.penalty_score
			.fetch_add(score, std::sync::atomic::Ordering::Relaxed);

		let threshold = triangular(constants::DELAYED_BLOCK_LENGTH);
		if score < threshold {
			return Ok(());
		}

		let log_fn: fn(&str) = if delayed >= constants::DELAYED_BLOCK_WARN_LEN {
			|msg| warn!("{}", msg)
		} else {
			|msg| info!("{}", msg)
		};
		log_fn(&format!(
			"penalty system: score {} crossed threshold {} over {} delayed blocks",
			score, threshold, delayed
		));

		if logonly {
			return Ok(());
		}

		if current_tip.saturating_sub(batch_tip_number) >= constants::DELAYED_BLOCK_LENGTH {
			if let Some((tip_hash, _)) = if reverse { batch.first() } else { batch.last() } {
				mark_bad_hash(*tip_hash);
			}
		}

		Err(ConsensusError::DelayTooHigh { score })
	}
}

fn triangular(l: u64) -> u64 {
	l * (l + 1) / 2
}
