// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The block/uncle/dev-fund reward schedule (spec §4.5).
//!
//! `accumulateRewards` in the reference implementation walks a cascading
//! chain of `if header.Number.Cmp(threshold) > 0 { block, dev = ...}`
//! statements, each overwriting the previous — the header's number falls
//! through to the *last* threshold it clears. [`reward_for_block`]
//! reproduces that fall-through precisely rather than as a sorted lookup,
//! since a naive "first match" table would invert the intended ordering.

use crate::header::BlockNumber;
use crate::U256;

/// One reward-schedule entry: the block number above which it applies, and
/// the (block reward, dev-fund reward) pair that kicks in from there.
struct Threshold {
	above: BlockNumber,
	block_reward_wei: u128,
	dev_reward_wei: u128,
}

/// Thresholds in ascending order, mirroring the literal order of `if`
/// statements in `accumulateRewards`. Each later entry overrides all
/// earlier ones once its number is cleared.
const THRESHOLDS: &[Threshold] = &[
	Threshold {
		above: 716_727,
		block_reward_wei: 10_000_000_000_000_000_000,
		dev_reward_wei: 200_000_000_000_000_000,
	},
	Threshold {
		above: 1_433_454,
		block_reward_wei: 9_000_000_000_000_000_000,
		dev_reward_wei: 300_000_000_000_000_000,
	},
	Threshold {
		above: 1_655_555,
		block_reward_wei: 9_000_000_000_000_000_000,
		dev_reward_wei: 1_350_000_000_000_000_000,
	},
	Threshold {
		above: 2_866_908,
		block_reward_wei: 8_000_000_000_000_000_000,
		dev_reward_wei: 1_350_000_000_000_000_000,
	},
	Threshold {
		above: 4_300_362,
		block_reward_wei: 7_000_000_000_000_000_000,
		dev_reward_wei: 1_200_000_000_000_000_000,
	},
	Threshold {
		above: 5_733_816,
		block_reward_wei: 6_000_000_000_000_000_000,
		dev_reward_wei: 1_050_000_000_000_000_000,
	},
	Threshold {
		above: 7_167_270,
		block_reward_wei: 5_000_000_000_000_000_000,
		dev_reward_wei: 900_000_000_000_000_000,
	},
	Threshold {
		above: 8_600_724,
		block_reward_wei: 4_000_000_000_000_000_000,
		dev_reward_wei: 750_000_000_000_000_000,
	},
	Threshold {
		above: 10_034_178,
		block_reward_wei: 3_000_000_000_000_000_000,
		dev_reward_wei: 600_000_000_000_000_000,
	},
	Threshold {
		above: 11_467_632,
		block_reward_wei: 2_000_000_000_000_000_000,
		dev_reward_wei: 450_000_000_000_000_000,
	},
	Threshold {
		above: 14_334_540,
		block_reward_wei: 1_000_000_000_000_000_000,
		dev_reward_wei: 300_000_000_000_000_000,
	},
];

/// The block reward and dev-fund reward that apply at a given block number,
/// before any uncle/nephew adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardShare {
	/// Wei credited to the block's coinbase (absent uncles).
	pub block_reward: U256,
	/// Wei credited to the dev fund address.
	pub dev_reward: U256,
}

/// The full reward payout for one block: the miner's share (including any
/// uncle-inclusion bonus), each uncle's own share, and the dev fund's cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSchedule {
	/// Total credited to `header.coinbase`: base block reward plus
	/// `uncles.len() * BASE_REWARD_WEI/32` nephew bonus.
	pub miner_reward: U256,
	/// Per-uncle rewards, `(coinbase, amount)`, one entry per uncle in the
	/// order supplied.
	pub uncle_rewards: Vec<(crate::Address, U256)>,
	/// Credited to the dev fund address, unconditionally.
	pub dev_reward: U256,
}

/// The base (block, dev) reward pair active at `number`, from §4.5's base
/// schedule before uncle/nephew adjustment.
pub fn reward_for_block(number: BlockNumber) -> RewardShare {
	let mut block_reward_wei: u128 = crate::constants::BASE_REWARD_WEI as u128;
	let mut dev_reward_wei: u128 = 100_000_000_000_000_000;

	for threshold in THRESHOLDS {
		if number > threshold.above {
			block_reward_wei = threshold.block_reward_wei;
			dev_reward_wei = threshold.dev_reward_wei;
		}
	}

	RewardShare {
		block_reward: U256::from(block_reward_wei),
		dev_reward: U256::from(dev_reward_wei),
	}
}

impl RewardSchedule {
	/// Compute the full payout for a block at `number`, given its uncles as
	/// `(coinbase, uncle_number)` pairs. The miner's own coinbase is not
	/// needed here — the caller already knows whose balance to credit with
	/// `miner_reward`.
	///
	/// Per-uncle reward is `(uncle_number + 2 - number) * BASE_REWARD_WEI / 2`,
	/// deliberately against the constant base reward rather than the
	/// epoch-scaled `block_reward` — `accumulateRewards` computes `r` from
	/// `ubiq.BlockReward`, a fixed `big.Int`, never the epoch-adjusted local
	/// `reward` variable. The miner additionally receives `BASE_REWARD_WEI /
	/// 32` per included uncle (the nephew bonus), also against the constant.
	pub fn compute(
		number: BlockNumber,
		uncles: &[(crate::Address, BlockNumber)],
	) -> RewardSchedule {
		let share = reward_for_block(number);
		let base_reward = crate::constants::base_reward();
		let mut miner_reward = share.block_reward;
		let mut uncle_rewards = Vec::with_capacity(uncles.len());

		let nephew_bonus = base_reward / U256::from(32);
		let half = base_reward / U256::from(2);

		for &(uncle_coinbase, uncle_number) in uncles {
			// uncle_number + 2 - number, as i128 since number can exceed uncle_number + 2.
			let delta = (uncle_number as i128 + 2) - number as i128;
			let delta = delta.max(0) as u128;
			let uncle_reward = half * U256::from(delta);
			uncle_rewards.push((uncle_coinbase, uncle_reward));
			miner_reward += nephew_bonus;
		}

		RewardSchedule {
			miner_reward,
			uncle_rewards,
			dev_reward: share.dev_reward,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_schedule_before_any_threshold() {
		let share = reward_for_block(1);
		assert_eq!(share.block_reward, U256::from(12_000_000_000_000_000_000u128));
		assert_eq!(share.dev_reward, U256::from(100_000_000_000_000_000u128));
	}

	#[test]
	fn dev_reward_switches_at_1_655_555() {
		let before = reward_for_block(1_655_555);
		let after = reward_for_block(1_655_556);
		assert_eq!(before.dev_reward, U256::from(300_000_000_000_000_000u128));
		assert_eq!(after.dev_reward, U256::from(1_350_000_000_000_000_000u128));
	}

	#[test]
	fn falls_through_to_the_last_cleared_threshold() {
		// Well past every threshold: the last entry must win, not the first.
		let share = reward_for_block(20_000_000);
		assert_eq!(share.block_reward, U256::from(1_000_000_000_000_000_000u128));
		assert_eq!(share.dev_reward, U256::from(300_000_000_000_000_000u128));
	}

	#[test]
	fn uncle_reward_is_zero_when_exactly_two_generations_back() {
		// Scenario from the end-to-end example: header.number=100, uncle.number=98.
		// r = (98 + 2 - 100) * BASE_REWARD / 2 = 0, but the nephew bonus still applies.
		let uncle_coinbase = crate::Address::from_low_u64_be(2);
		let schedule = RewardSchedule::compute(100, &[(uncle_coinbase, 98)]);
		let base_reward = crate::constants::base_reward();
		assert_eq!(schedule.uncle_rewards, vec![(uncle_coinbase, U256::zero())]);
		assert_eq!(schedule.miner_reward, base_reward + base_reward / U256::from(32));
	}

	#[test]
	fn uncle_one_generation_back_gets_half_base_reward() {
		let uncle_coinbase = crate::Address::from_low_u64_be(2);
		// uncle.number = 99, header.number = 100: (99 + 2 - 100) = 1.
		let schedule = RewardSchedule::compute(100, &[(uncle_coinbase, 99)]);
		let base_reward = crate::constants::base_reward();
		assert_eq!(
			schedule.uncle_rewards,
			vec![(uncle_coinbase, base_reward / U256::from(2))]
		);
	}
}
