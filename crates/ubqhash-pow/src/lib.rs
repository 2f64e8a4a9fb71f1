// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Proof-of-work target math, the `PowOracle` collaborator boundary, seal
//! evaluation, and the three-era difficulty retargeting engine.

pub mod difficulty;
pub mod mode;
pub mod oracle;
pub mod seal;
pub mod target;

pub use difficulty::{calc_difficulty, Regime};
pub use mode::PowMode;
pub use oracle::{epoch_of, EpochLease, Evaluation, NullOracle, PowOracle};
pub use seal::verify_seal;
pub use target::{boundary_to_difficulty, difficulty_to_target, result_satisfies_difficulty};
