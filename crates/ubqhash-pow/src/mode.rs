// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Seal-verification strategy, as a tagged enum rather than scattered
//! `if cfg.fake { ... }` branching (spec §9's "Polymorphism over PoW mode").

use std::sync::Arc;
use std::time::Duration;

use ubqhash_types::header::BlockNumber;

use crate::oracle::PowOracle;

/// The strategy a running engine uses to evaluate seals.
///
/// `Normal` and `Shared` both run the real PoW function; `Shared` wraps an
/// oracle owned by another engine instance so caches/datasets aren't
/// duplicated across the many ephemeral engines a test harness might spin
/// up. `Test`, `Fake` and `FullFake` exist purely for fast, deterministic
/// test fixtures.
#[derive(Clone)]
pub enum PowMode {
	/// Evaluate seals against a real, owned `PowOracle`.
	Normal(Arc<dyn PowOracle>),
	/// Evaluate seals against an oracle shared with another engine.
	Shared(Arc<dyn PowOracle>),
	/// Evaluate seals against a real oracle forced to a tiny (32 KiB) cache,
	/// for fast tests that still exercise the real hash path.
	Test(Arc<dyn PowOracle>),
	/// Accept everything after sleeping `delay`, optionally failing once the
	/// chain reaches `fail_at`.
	Fake {
		/// Artificial per-seal delay, simulating real PoW evaluation cost.
		delay: Duration,
		/// If set, `verify_seal` rejects exactly this block number.
		fail_at: Option<BlockNumber>,
	},
	/// Accept everything, unconditionally, with no delay. Used for chains
	/// that never exercise the PoW path at all (e.g. pure reward-accounting
	/// tests).
	FullFake,
}

impl PowMode {
	/// Whether `MinerAPI` requests are accepted in this mode (§4.7: Fake and
	/// FullFake reject).
	pub fn accepts_miner_api(&self) -> bool {
		matches!(self, PowMode::Normal(_) | PowMode::Test(_))
	}
}

impl std::fmt::Debug for PowMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PowMode::Normal(_) => write!(f, "PowMode::Normal"),
			PowMode::Shared(_) => write!(f, "PowMode::Shared"),
			PowMode::Test(_) => write!(f, "PowMode::Test"),
			PowMode::Fake { delay, fail_at } => {
				write!(f, "PowMode::Fake {{ delay: {:?}, fail_at: {:?} }}", delay, fail_at)
			}
			PowMode::FullFake => write!(f, "PowMode::FullFake"),
		}
	}
}
