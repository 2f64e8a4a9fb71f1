// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Protocol constants, bit-exact with the reference implementation
//! (`consensus/ubqhash/consensus.go` in go-ath).

use crate::{Address, U256};

/// Maximum size, in bytes, of a header's `extra` field.
pub const MAX_EXTRA_SIZE: usize = 32;

/// Minimum allowed block gas limit.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// Divisor bounding how far the gas limit may drift from its parent's per block.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Difficulty floor enforced by the V2 and Flux regimes (not Orig, see
/// `DifficultyEngine`'s module docs for the historical quirk this preserves).
pub const MIN_DIFFICULTY: u64 = 131_072;

/// Target seconds between blocks, constant across every difficulty regime.
pub const BLOCK_TIME_SECONDS: u64 = 22;

/// Window length (in blocks) of the Orig (Digishield v3) regime.
pub const WINDOW_ORIG: u64 = 22;

/// Window length (in blocks) shared by the V2 and Flux regimes.
pub const WINDOW_WIDE: u64 = 88;

/// Parent block number at or above which the V2 regime takes over from Orig.
pub const REGIME_V2_START: u64 = 4088;

/// Parent block number at or above which the Flux regime takes over from V2.
pub const REGIME_FLUX_START: u64 = 8000;

/// Maximum number of uncles a block may declare.
pub const MAX_UNCLES: usize = 2;

/// Depth of the ancestor scan performed by the uncle verifier.
pub const UNCLE_ANCESTRY_DEPTH: usize = 7;

/// Slack allowed between a header's timestamp and the verifying node's clock.
pub const ALLOWED_FUTURE_SECONDS: u64 = 15;

/// Number of ancestor timestamps the median-time collaborator averages over.
pub const MEDIAN_TIME_WINDOW: usize = 11;

/// Canonical-tip distance beyond which an inbound batch is penalty-checked.
pub const DELAYED_INFO_LEN: u64 = 3;

/// Threshold that scales the triangular-number penalty bound (§4.6).
pub const DELAYED_BLOCK_LENGTH: u64 = 10;

/// Per-batch delay length above which a penalty check logs at `warn!` instead
/// of `info!`, matching `penaltysystem.go`'s `delayedBlockWarnLen`.
pub const DELAYED_BLOCK_WARN_LEN: u64 = 15;

/// Number of blocks per PoW cache/dataset epoch.
pub const EPOCH_LENGTH: u64 = 30000;

/// Base reward used for uncle/nephew reward math; distinct from the
/// epoch-scaled miner reward (see `reward` module).
pub const BASE_REWARD_WEI: u64 = 12_000_000_000_000_000_000;

/// The developer fund beneficiary address, fixed for the lifetime of the chain.
pub fn dev_fund_address() -> Address {
	// 0x3e5c79bc6742ff23a884b8db576bd401b3e7ff59
	Address::from_slice(&[
		0x3e, 0x5c, 0x79, 0xbc, 0x67, 0x42, 0xff, 0x23, 0xa8, 0x84, 0xb8, 0xdb, 0x57, 0x6b, 0xd4,
		0x01, 0xb3, 0xe7, 0xff, 0x59,
	])
}

/// `BASE_REWARD_WEI` as a `U256`, for use in reward arithmetic.
pub fn base_reward() -> U256 {
	U256::from(BASE_REWARD_WEI)
}
