// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! `target = floor(2**256 / difficulty)`, computed without a 512-bit type.
//!
//! `2**256` does not fit in a `U256`, so the divide is split as
//! `((1 << 255) / difficulty) << 1`, the same trick the reference Rust
//! ethash crates use to sidestep needing `U512` for this one computation.

use ubqhash_types::{Hash, U256};

/// The PoW target for a given difficulty: the inclusive ceiling a sealed
/// result must fall under. `difficulty <= 1` degenerates to the maximum
/// possible target.
pub fn difficulty_to_target(difficulty: U256) -> U256 {
	if difficulty <= U256::one() {
		U256::max_value()
	} else {
		((U256::one() << 255) / difficulty) << 1
	}
}

/// The difficulty implied by a PoW boundary (inverse of [`difficulty_to_target`]).
pub fn boundary_to_difficulty(boundary: Hash) -> U256 {
	let d = U256::from(boundary.as_bytes());
	if d <= U256::one() {
		U256::max_value()
	} else {
		((U256::one() << 255) / d) << 1
	}
}

/// Interpret a 32-byte PoW result as a big-endian unsigned integer and
/// compare against the difficulty-derived target (§4.4 step 5).
pub fn result_satisfies_difficulty(result: &[u8; 32], difficulty: U256) -> bool {
	let value = U256::from_big_endian(result);
	value <= difficulty_to_target(difficulty)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn target_at_difficulty_two_is_half_of_max() {
		let target = difficulty_to_target(U256::from(2));
		assert_eq!(target, U256::one() << 255);
	}

	#[test]
	fn difficulty_one_or_zero_yields_max_target() {
		assert_eq!(difficulty_to_target(U256::zero()), U256::max_value());
		assert_eq!(difficulty_to_target(U256::one()), U256::max_value());
	}

	#[test]
	fn result_at_exactly_target_is_accepted() {
		let difficulty = U256::from(131_072u64);
		let target = difficulty_to_target(difficulty);
		let mut bytes = [0u8; 32];
		target.to_big_endian(&mut bytes);
		assert!(result_satisfies_difficulty(&bytes, difficulty));
	}

	#[test]
	fn result_above_target_is_rejected() {
		let difficulty = U256::from(1_000_000_000u64);
		let target = difficulty_to_target(difficulty);
		let above = target + U256::one();
		let mut bytes = [0u8; 32];
		above.to_big_endian(&mut bytes);
		assert!(!result_satisfies_difficulty(&bytes, difficulty));
	}
}
