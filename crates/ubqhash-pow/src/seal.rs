// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Seal evaluation (§4.4), dispatched through a [`PowMode`].

use ubqhash_types::{ConsensusError, Header};

use crate::mode::PowMode;
use crate::target::result_satisfies_difficulty;

/// Verify a header's seal under the given mode.
///
/// `Fake` sleeps its configured delay and fails exactly at `fail_at`;
/// `FullFake` always succeeds; `Normal`/`Shared`/`Test` run the real
/// evaluate-then-compare procedure against the mode's oracle.
pub fn verify_seal(mode: &PowMode, header: &Header) -> Result<(), ConsensusError> {
	match mode {
		PowMode::FullFake => Ok(()),
		PowMode::Fake { delay, fail_at } => {
			std::thread::sleep(*delay);
			if *fail_at == Some(header.number()) {
				Err(ConsensusError::InvalidProofOfWork)
			} else {
				Ok(())
			}
		}
		PowMode::Normal(oracle) | PowMode::Shared(oracle) | PowMode::Test(oracle) => {
			if header.difficulty().is_zero() {
				return Err(ConsensusError::InvalidDifficulty {
					found: header.difficulty(),
					expected: header.difficulty(),
				});
			}
			let _lease = oracle.pin_epoch(header.number());
			let (digest, result) =
				oracle.evaluate(header.number(), header.seal_hash(), header.nonce());

			if digest != header.mix_digest().to_fixed_bytes() {
				return Err(ConsensusError::InvalidMixDigest);
			}
			if !result_satisfies_difficulty(&result, header.difficulty()) {
				return Err(ConsensusError::InvalidProofOfWork);
			}
			Ok(())
		}
	}
}
