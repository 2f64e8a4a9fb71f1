// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Consensus error kinds. Each is a distinct variant so callers can match on
//! the exact rule that rejected a header, mirroring the private `err*`
//! sentinel values of `consensus/ubqhash/consensus.go` and the `errs`
//! package of go-ath.

use std::fmt;

use derive_more::Display;

use crate::{BlockNumber, Hash, U256};

/// Every way a header, uncle or batch can fail Ubqhash consensus rules.
///
/// Variant names double as the failure's category from spec §7: Shape,
/// Temporal, Ancestry, Difficulty, Seal and Operational are each
/// represented by a contiguous run of variants below.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConsensusError {
	/// `header.extra` exceeded `MAX_EXTRA_SIZE`.
	#[display(fmt = "extra-data too long: {} > {}", found, max)]
	ExtraDataTooLong {
		/// Actual length in bytes.
		found: usize,
		/// `MAX_EXTRA_SIZE`.
		max: usize,
	},

	/// `gas_limit` exceeded `2^63 - 1`, or drifted too far from the parent's.
	#[display(fmt = "invalid gas limit: {}", _0)]
	InvalidGasLimit(String),

	/// `gas_used` exceeded `gas_limit`.
	#[display(fmt = "invalid gas used: have {}, limit {}", used, limit)]
	InvalidGasUsed {
		/// Reported gas used.
		used: U256,
		/// Header's own gas limit.
		limit: U256,
	},

	/// `header.number != parent.number + 1`.
	#[display(fmt = "invalid block number: have {}, want {}", found, expected)]
	InvalidBlockNumber {
		/// Value the header carried.
		found: BlockNumber,
		/// `parent.number + 1`.
		expected: BlockNumber,
	},

	/// Header timestamp is further in the future than `ALLOWED_FUTURE_SECONDS`.
	#[display(fmt = "timestamp too far in the future: {}", _0)]
	FutureBlock(u64),

	/// Header timestamp did not strictly increase over the parent's.
	#[display(fmt = "timestamp {} does not exceed parent timestamp {}", found, parent)]
	TimestampNotIncreasing {
		/// Header's timestamp.
		found: u64,
		/// Parent's timestamp.
		parent: u64,
	},

	/// A header's parent could not be located.
	#[display(fmt = "unknown ancestor")]
	UnknownAncestor,

	/// An uncle is itself an ancestor of the block that includes it.
	#[display(fmt = "uncle is ancestor")]
	UncleIsAncestor,

	/// An uncle's parent was not found among the scanned ancestry window.
	#[display(fmt = "uncle's parent is not a recent ancestor")]
	DanglingUncle,

	/// The same uncle hash appears twice (or was already rewarded upstream).
	#[display(fmt = "duplicate uncle")]
	DuplicateUncle,

	/// More than `MAX_UNCLES` uncles were declared.
	#[display(fmt = "too many uncles: {} > {}", found, max)]
	TooManyUncles {
		/// Number of uncles declared.
		found: usize,
		/// `MAX_UNCLES`.
		max: usize,
	},

	/// Declared difficulty did not match the value `DifficultyEngine` computed,
	/// or was non-positive.
	#[display(fmt = "invalid difficulty: have {}, want {}", found, expected)]
	InvalidDifficulty {
		/// Value the header carried.
		found: U256,
		/// Value `DifficultyEngine` computed.
		expected: U256,
	},

	/// The PoW-computed mix digest did not match `header.mix_digest`.
	#[display(fmt = "invalid mix digest")]
	InvalidMixDigest,

	/// The PoW result exceeded the difficulty-derived target.
	#[display(fmt = "invalid proof-of-work")]
	InvalidProofOfWork,

	/// `header.nonce`, when interpreted by the PoW oracle, fell outside its
	/// accepted range (e.g. a Fake-mode configured failure block).
	#[display(fmt = "nonce out of range")]
	NonceOutOfRange,

	/// The engine's exit signal fired while a MinerAPI request was in flight.
	#[display(fmt = "engine stopped")]
	EngineStopped,

	/// A MinerAPI method was called while the engine was not in `Normal` or
	/// `Test` mode.
	#[display(fmt = "not supported")]
	NotSupported,

	/// The penalty system rejected an inbound batch as a probable
	/// 51%-style rewrite.
	#[display(fmt = "delay too high: penalty score {} crossed threshold", score)]
	DelayTooHigh {
		/// The computed penalty score.
		score: u64,
	},
}

impl std::error::Error for ConsensusError {}

/// A block or uncle hash paired with the error that rejected it, used by the
/// batch verifier's result stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedError {
	/// Position of the header within the submitted batch.
	pub index: usize,
	/// Hash of the offending header, if known at the point of failure.
	pub hash: Option<Hash>,
	/// The rule that was violated.
	pub error: ConsensusError,
}

impl fmt::Display for IndexedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "header #{}: {}", self.index, self.error)
	}
}
