// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

//! Shared data types for the Ubqhash proof-of-work consensus engine:
//! headers, blocks, protocol constants and the reward schedule.

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod reward;

pub use ethereum_types::{Address, Bloom, H256, H64, U256};
pub use parity_bytes::Bytes;

pub use block::Block;
pub use chain::ChainReader;
pub use config::ChainConfig;
pub use error::{ConsensusError, IndexedError};
pub use header::{BlockNumber, Header, HeaderBuilder};
pub use reward::{reward_for_block, RewardSchedule, RewardShare};

/// A block hash. Alias kept distinct from other 32-byte fields for clarity
/// at call sites, matching the teacher's convention of aliasing
/// `ethereum_types::H256` per semantic role.
pub type Hash = H256;
