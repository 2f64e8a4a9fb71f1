// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Reward accumulation at `Finalize` (§4.5): turns a block's header and
//! uncles into the set of balance credits the host should apply.
//!
//! The `header.number < 10` branch documented in the reference
//! implementation recomputes a nephew-bonus-shaped value for uncles below
//! block 10 and then never reads it before returning — observably dead
//! code. We reproduce the *effect* (uncle.coinbase is credited with the
//! original `r`, nothing else changes) without carrying the dead
//! recomputation forward; see DESIGN.md.

use ubqhash_types::{constants, Address, Block, RewardSchedule, U256};

/// One balance credit produced by finalizing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
	/// The account to credit.
	pub account: Address,
	/// The amount, in wei.
	pub amount: U256,
}

/// Compute every credit `block`'s finalization produces: the miner (base
/// reward plus nephew bonuses), each uncle, and the dev fund.
pub fn accumulate_rewards(block: &Block) -> Vec<Credit> {
	let header = block.header();
	let uncles: Vec<(Address, u64)> = block
		.uncles()
		.iter()
		.map(|u| (u.coinbase(), u.number()))
		.collect();

	let schedule: RewardSchedule = RewardSchedule::compute(header.number(), &uncles);

	let mut credits = Vec::with_capacity(block.uncles().len() + 2);
	credits.push(Credit {
		account: header.coinbase(),
		amount: schedule.miner_reward,
	});
	for (account, amount) in schedule.uncle_rewards {
		credits.push(Credit { account, amount });
	}
	credits.push(Credit {
		account: constants::dev_fund_address(),
		amount: schedule.dev_reward,
	});
	credits
}

#[cfg(test)]
mod tests {
	use super::*;
	use ubqhash_types::HeaderBuilder;

	#[test]
	fn no_uncles_credits_miner_and_dev_fund_only() {
		let header = HeaderBuilder::default().number(1).build();
		let block = Block::new(header.clone(), vec![], vec![], vec![]);
		let credits = accumulate_rewards(&block);
		assert_eq!(credits.len(), 2);
		assert_eq!(credits[0].account, header.coinbase());
		assert_eq!(credits[0].amount, U256::from(12_000_000_000_000_000_000u128));
		assert_eq!(credits[1].account, constants::dev_fund_address());
	}

	#[test]
	fn uncle_credits_uncle_coinbase_and_nephew_bonus() {
		let header = HeaderBuilder::default().number(100).build();
		let uncle = HeaderBuilder::default()
			.number(98)
			.coinbase(Address::from_low_u64_be(7))
			.build();
		let block = Block::new(header.clone(), vec![uncle], vec![], vec![]);
		let credits = accumulate_rewards(&block);
		assert_eq!(credits.len(), 3);
		assert_eq!(credits[1].account, Address::from_low_u64_be(7));
		assert_eq!(credits[1].amount, U256::zero());
		let base_reward = constants::base_reward();
		assert_eq!(credits[0].amount, base_reward + base_reward / U256::from(32));
	}
}
