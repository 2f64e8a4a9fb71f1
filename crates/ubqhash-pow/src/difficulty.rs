// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Three-era difficulty retargeting (§4.1): Orig (Digishield v3), V2 and
//! Flux, dispatched on the *parent's* block number.
//!
//! The arithmetic here is deliberately verbatim against the reference
//! implementation down to operation order — see the module-level open
//! questions this preserves:
//! - `calcDifficultyOrig` never applies the `MIN_DIFFICULTY` floor that V2
//!   and Flux apply. That asymmetry is intentional, not an oversight to fix.
//! - Flux's bound selection reads the dampened `actual` *before* reassigning
//!   it, so the post-clamp value can end up larger than the pre-clamp one
//!   when the tighter, dampened bound is chosen. Reordering this to "clamp
//!   to whichever bound is closer" would change observable difficulties.

use ubqhash_types::constants;
use ubqhash_types::{ChainReader, Header, U256};

/// Which retargeting algorithm applies, chosen from the parent's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
	/// `parent.number < REGIME_V2_START`.
	Orig,
	/// `REGIME_V2_START <= parent.number < REGIME_FLUX_START`.
	V2,
	/// `parent.number >= REGIME_FLUX_START`.
	Flux,
}

impl Regime {
	/// Select the regime active for `parent_number`.
	pub fn for_parent(parent_number: u64) -> Regime {
		if parent_number >= constants::REGIME_FLUX_START {
			Regime::Flux
		} else if parent_number >= constants::REGIME_V2_START {
			Regime::V2
		} else {
			Regime::Orig
		}
	}

	/// The averaging window, in blocks, for this regime.
	pub fn window(self) -> u64 {
		match self {
			Regime::Orig => constants::WINDOW_ORIG,
			Regime::V2 | Regime::Flux => constants::WINDOW_WIDE,
		}
	}
}

/// Truncating-toward-zero integer division, matching Go's `/` on `big.Int`
/// (and C's) for both positive and negative dividends — `i64`'s `/` already
/// has this semantics, so this exists purely to name the requirement at
/// call sites that care.
fn trunc_div(a: i64, b: i64) -> i64 {
	a / b
}

/// Recompute the expected difficulty for a child of `parent` timestamped at
/// `child_timestamp`, dispatching on the parent's number per §4.1.
pub fn calc_difficulty(
	chain: &dyn ChainReader,
	parent: &Header,
	child_timestamp: u64,
) -> U256 {
	match Regime::for_parent(parent.number()) {
		Regime::Orig => calc_difficulty_orig(chain, parent),
		Regime::V2 => calc_difficulty_v2(chain, parent),
		Regime::Flux => calc_difficulty_flux(chain, parent, child_timestamp),
	}
}

const T: i64 = constants::BLOCK_TIME_SECONDS as i64;

/// Dampen a raw window actual toward the target window span, absorbing 3/4
/// of the deviation (§4.1 step 4; GLOSSARY "Dampening").
fn dampen(actual: i64, window_target: i64) -> i64 {
	window_target + trunc_div(actual - window_target, 4)
}

fn median_window_actual(chain: &dyn ChainReader, parent: &Header, window: u64) -> i64 {
	let median_last = chain.median_time(parent.number(), parent) as i64;
	let median_first = chain.median_time(parent.number().saturating_sub(window), parent) as i64;
	median_last - median_first
}

fn retarget(parent_difficulty: U256, window_target: i64, actual: i64) -> U256 {
	// actual is clamped to a strictly positive range by every caller before
	// reaching here, so the division is always well-defined.
	let actual = actual.max(1) as u128;
	parent_difficulty * U256::from(window_target as u128) / U256::from(actual)
}

/// The Orig (Digishield v3) regime: window 22, dampening /4, bounds
/// +16%/−8%, **no** `MIN_DIFFICULTY` floor.
fn calc_difficulty_orig(chain: &dyn ChainReader, parent: &Header) -> U256 {
	let window = constants::WINDOW_ORIG;
	if parent.number() <= window {
		return parent.difficulty();
	}

	let window_target = window as i64 * T;
	let raw_actual = median_window_actual(chain, parent, window);
	let mut actual = dampen(raw_actual, window_target);

	let min_actual = window_target * 92 / 100;
	let max_actual = window_target * 116 / 100;
	actual = actual.clamp(min_actual, max_actual);

	retarget(parent.difficulty(), window_target, actual)
}

/// The V2 regime: window 88, dampening /4, bounds +3%/−2%, with the
/// `MIN_DIFFICULTY` floor.
fn calc_difficulty_v2(chain: &dyn ChainReader, parent: &Header) -> U256 {
	let window = constants::WINDOW_WIDE;
	let window_target = window as i64 * T;
	let raw_actual = median_window_actual(chain, parent, window);
	let mut actual = dampen(raw_actual, window_target);

	let min_actual = window_target * 98 / 100;
	let max_actual = window_target * 103 / 100;
	actual = actual.clamp(min_actual, max_actual);

	let diff = retarget(parent.difficulty(), window_target, actual);
	apply_floor(diff)
}

/// The Flux regime: window 88, dampening /4, per-mille bounds 0.5%/0.3%
/// normal and 0.1%/0.1% dampened, selected by the single-block `diffTime`
/// (§4.1 "Flux additional rule"), with the `MIN_DIFFICULTY` floor.
fn calc_difficulty_flux(chain: &dyn ChainReader, parent: &Header, child_timestamp: u64) -> U256 {
	let window = constants::WINDOW_WIDE;
	let window_target = window as i64 * T;
	let raw_actual = median_window_actual(chain, parent, window);
	let mut actual = dampen(raw_actual, window_target);

	let min_actual_normal = window_target * 997 / 1000;
	let min_actual_dampened = window_target * 999 / 1000;
	let max_actual_normal = window_target * 1005 / 1000;
	let max_actual_dampened = window_target * 1001 / 1000;

	let diff_time = child_timestamp as i64 - parent.timestamp() as i64;

	// Preserve exact ordering: the comparisons below read `actual` as it
	// stood after dampening, before either branch reassigns it.
	if actual < min_actual_normal {
		actual = if diff_time > 2 * T {
			min_actual_dampened
		} else {
			min_actual_normal
		};
	}
	if actual > max_actual_normal {
		actual = if diff_time < T / 2 {
			max_actual_dampened
		} else {
			max_actual_normal
		};
	}

	let diff = retarget(parent.difficulty(), window_target, actual);
	apply_floor(diff)
}

fn apply_floor(difficulty: U256) -> U256 {
	let floor = U256::from(constants::MIN_DIFFICULTY);
	if difficulty < floor {
		floor
	} else {
		difficulty
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ubqhash_types::{BlockNumber, Block, ChainConfig, Hash, HeaderBuilder};

	struct FixedMedianChain {
		median_last: u64,
		median_first: u64,
	}

	impl ChainReader for FixedMedianChain {
		fn get_header(&self, _hash: Hash, _number: BlockNumber) -> Option<Header> {
			None
		}
		fn get_block(&self, _hash: Hash, _number: BlockNumber) -> Option<Block> {
			None
		}
		fn median_time(&self, block_number: BlockNumber, parent: &Header) -> u64 {
			if block_number == parent.number() {
				self.median_last
			} else {
				self.median_first
			}
		}
		fn config(&self) -> ChainConfig {
			ChainConfig::default()
		}
	}

	#[test]
	fn orig_regime_stable_timing_holds_difficulty() {
		let chain = FixedMedianChain {
			median_last: 22_000,
			median_first: 21_516, // actual = 484 = N*T
		};
		let parent = HeaderBuilder::default()
			.number(1000)
			.difficulty(U256::from(10_000_000u64))
			.build();
		let new_diff = calc_difficulty(&chain, &parent, parent.timestamp() + 22);
		assert_eq!(new_diff, U256::from(10_000_000u64));
	}

	#[test]
	fn orig_regime_fast_blocks_clamps_and_increases_difficulty() {
		let chain = FixedMedianChain {
			median_last: 242,
			median_first: 0, // actual = 242, half of N*T=484
		};
		let parent = HeaderBuilder::default()
			.number(1000)
			.difficulty(U256::from(10_000_000u64))
			.build();
		let new_diff = calc_difficulty(&chain, &parent, parent.timestamp() + 22);
		assert_eq!(new_diff, U256::from(10_876_404u64));
	}

	#[test]
	fn parent_at_or_below_window_returns_unchanged_under_orig() {
		let chain = FixedMedianChain {
			median_last: 0,
			median_first: 0,
		};
		let parent = HeaderBuilder::default()
			.number(constants::WINDOW_ORIG)
			.difficulty(U256::from(999u64))
			.build();
		let new_diff = calc_difficulty(&chain, &parent, parent.timestamp() + 22);
		assert_eq!(new_diff, U256::from(999u64));
	}

	#[test]
	fn regime_boundaries_select_expected_era() {
		assert_eq!(Regime::for_parent(4087), Regime::Orig);
		assert_eq!(Regime::for_parent(4088), Regime::V2);
		assert_eq!(Regime::for_parent(7999), Regime::V2);
		assert_eq!(Regime::for_parent(8000), Regime::Flux);
	}

	#[test]
	fn v2_regime_applies_min_difficulty_floor() {
		let window_target = constants::WINDOW_WIDE as i64 * T;
		let chain = FixedMedianChain {
			median_last: window_target as u64,
			median_first: 0,
		};
		let parent = HeaderBuilder::default()
			.number(5000)
			.difficulty(U256::from(1u64))
			.build();
		let new_diff = calc_difficulty(&chain, &parent, parent.timestamp() + 22);
		assert_eq!(new_diff, U256::from(constants::MIN_DIFFICULTY));
	}

	#[test]
	fn flux_dampened_down_bound_under_short_diff_time() {
		// diffTime < T/2 triggers the dampened (tighter) max bound.
		let window_target = constants::WINDOW_WIDE as i64 * T;
		// actual overruns max_actual_normal heavily.
		let chain = FixedMedianChain {
			median_last: (window_target * 2) as u64,
			median_first: 0,
		};
		let parent = HeaderBuilder::default()
			.number(9000)
			.difficulty(U256::from(1_000_000_000u64))
			.timestamp(1_000_000)
			.build();
		let child_timestamp = parent.timestamp() + 10; // < T/2 = 11
		let new_diff = calc_difficulty(&chain, &parent, child_timestamp);
		// Dampened bound (0.1%) means at most a tiny decrease from parent's difficulty.
		assert!(new_diff <= parent.difficulty());
		let max_drop = parent.difficulty() / U256::from(1000); // generous upper bound on the drop
		assert!(parent.difficulty() - new_diff <= max_drop);
	}
}
