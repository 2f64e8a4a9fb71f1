// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Single-header rule checking (§4.2) and the concurrent, in-order batch
//! verifier built on top of it.

use std::sync::Arc;
use std::thread;

use ubqhash_pow::{verify_seal, PowMode};
use ubqhash_types::{ChainReader, ConsensusError, Header, IndexedError};

/// Verifies headers against their parents using a fixed [`PowMode`] and a
/// [`ChainReader`] collaborator for parent/median-timestamp lookups.
pub struct HeaderVerifier<C: ChainReader> {
	chain: Arc<C>,
	mode: PowMode,
}

impl<C: ChainReader> HeaderVerifier<C> {
	/// Build a verifier over `chain`, evaluating seals under `mode`.
	pub fn new(chain: Arc<C>, mode: PowMode) -> Self {
		HeaderVerifier { chain, mode }
	}

	/// Single-header contract (§4.2): validate `header` against `parent`.
	///
	/// A header already known to `chain` short-circuits to `Ok(())` without
	/// re-running any of the checks below, matching the reference
	/// implementation's `VerifyHeader`.
	///
	/// `is_uncle` relaxes the future-timestamp check (uncles may be
	/// future-dated relative to the importing node); `check_seal` gates
	/// whether §4.4 runs.
	pub fn verify_header(
		&self,
		header: &Header,
		parent: &Header,
		is_uncle: bool,
		check_seal: bool,
	) -> Result<(), ConsensusError> {
		if self.chain.get_header(header.hash(), header.number()).is_some() {
			return Ok(());
		}

		let config = self.chain.config();

		if header.extra().len() > config.max_extra_size {
			return Err(ConsensusError::ExtraDataTooLong {
				found: header.extra().len(),
				max: config.max_extra_size,
			});
		}

		if !is_uncle {
			let now = current_unix_time();
			if header.timestamp() > now + ubqhash_types::constants::ALLOWED_FUTURE_SECONDS {
				return Err(ConsensusError::FutureBlock(header.timestamp()));
			}
		}

		if header.timestamp() <= parent.timestamp() {
			return Err(ConsensusError::TimestampNotIncreasing {
				found: header.timestamp(),
				parent: parent.timestamp(),
			});
		}

		let expected_difficulty =
			ubqhash_pow::calc_difficulty(self.chain.as_ref(), parent, header.timestamp());
		if header.difficulty() != expected_difficulty {
			return Err(ConsensusError::InvalidDifficulty {
				found: header.difficulty(),
				expected: expected_difficulty,
			});
		}

		if header.gas_limit() > i64::MAX as u64 {
			return Err(ConsensusError::InvalidGasLimit(format!(
				"gas limit {} exceeds 2^63-1",
				header.gas_limit()
			)));
		}
		if header.gas_used() > header.gas_limit() {
			return Err(ConsensusError::InvalidGasUsed {
				used: header.gas_used().into(),
				limit: header.gas_limit().into(),
			});
		}

		let drift = (header.gas_limit() as i128 - parent.gas_limit() as i128).unsigned_abs();
		let bound = parent.gas_limit() / config.gas_limit_bound_divisor;
		if drift as u64 >= bound {
			return Err(ConsensusError::InvalidGasLimit(format!(
				"gas limit drift {} exceeds bound {}",
				drift, bound
			)));
		}
		if header.gas_limit() < config.min_gas_limit {
			return Err(ConsensusError::InvalidGasLimit(format!(
				"gas limit {} below minimum {}",
				header.gas_limit(),
				config.min_gas_limit
			)));
		}

		if header.number() != parent.number() + 1 {
			return Err(ConsensusError::InvalidBlockNumber {
				found: header.number(),
				expected: parent.number() + 1,
			});
		}

		if check_seal {
			verify_seal(&self.mode, header)?;
		}

		Ok(())
	}

	/// The batch contract (§4.2): verify `headers` concurrently, in
	/// submission order, against `seals[i]` controlling whether header `i`'s
	/// seal is checked. Returns results in the same order as `headers`.
	///
	/// `abort` lets a caller cancel outstanding work: closing it causes the
	/// dispatcher to stop feeding new indices and return immediately, and
	/// workers drain naturally once `inputs` closes behind it. In-flight
	/// verifications are not preempted (§5) — headers already dispatched to
	/// a worker still complete, but no *new* index is handed out once abort
	/// fires.
	pub fn verify_batch(
		&self,
		headers: &[Header],
		seals: &[bool],
		abort: crossbeam_channel::Receiver<()>,
	) -> Vec<Result<(), IndexedError>>
	where
		C: 'static,
	{
		let n = headers.len();
		if n == 0 {
			return Vec::new();
		}
		let workers = n.min(num_cpus::get()).max(1);

		let (input_tx, input_rx) = crossbeam_channel::unbounded::<usize>();
		let (done_tx, done_rx) = crossbeam_channel::bounded::<(usize, Result<(), ConsensusError>)>(n);

		let headers = Arc::new(headers.to_vec());
		let seals = Arc::new(seals.to_vec());
		let chain = Arc::clone(&self.chain);
		let mode = self.mode.clone();

		thread::scope(|scope| {
			for _ in 0..workers {
				let input_rx = input_rx.clone();
				let done_tx = done_tx.clone();
				let headers = Arc::clone(&headers);
				let seals = Arc::clone(&seals);
				let chain = Arc::clone(&chain);
				let mode = mode.clone();

				// Workers only ever block on `inputs`; they never look at
				// `abort` themselves (§5) — the dispatcher closing `inputs`
				// is what makes them drain and exit.
				scope.spawn(move || {
					while let Ok(idx) = input_rx.recv() {
						let verifier = HeaderVerifier {
							chain: Arc::clone(&chain),
							mode: mode.clone(),
						};
						let header = &headers[idx];

						let result = if chain.get_header(header.hash(), header.number()).is_some() {
							Ok(())
						} else {
							let parent_lookup = if idx == 0 {
								chain.get_header(header.parent_hash(), header.number().saturating_sub(1))
							} else {
								Some(headers[idx - 1].clone())
							};

							match parent_lookup {
								None => Err(ConsensusError::UnknownAncestor),
								Some(parent) => {
									if idx > 0 && parent.hash() != header.parent_hash() {
										Err(ConsensusError::UnknownAncestor)
									} else {
										verifier.verify_header(header, &parent, false, seals[idx])
									}
								}
							}
						};

						if done_tx.send((idx, result)).is_err() {
							break;
						}
					}
				});
			}
			drop(done_tx);

			// Dispatcher: the sole owner of the `checked` bitmap and `out`
			// cursor. Selects over sending the next index, receiving a
			// completion, and the abort signal.
			let mut checked: Vec<Option<Result<(), ConsensusError>>> = vec![None; n];
			let mut out_cursor = 0usize;
			let mut next_to_send = 0usize;
			let mut received = 0usize;
			let mut aborted = false;

			while received < n {
				crossbeam_channel::select! {
					recv(abort) -> _ => {
						aborted = true;
						break;
					},
					send(input_tx, next_to_send) -> res if next_to_send < n => {
						if res.is_ok() {
							next_to_send += 1;
						}
					},
					recv(done_rx) -> msg => {
						match msg {
							Ok((idx, result)) => {
								checked[idx] = Some(result);
								received += 1;
								while out_cursor < n && checked[out_cursor].is_some() {
									out_cursor += 1;
								}
							}
							Err(_) => break,
						}
					},
				}
			}
			drop(input_tx);

			if aborted {
				while received < n {
					match done_rx.recv() {
						Ok((idx, result)) => {
							checked[idx] = Some(result);
							received += 1;
						}
						Err(_) => break,
					}
				}
			}

			checked
				.into_iter()
				.enumerate()
				.map(|(idx, slot)| match slot {
					Some(Ok(())) => Ok(()),
					Some(Err(error)) => Err(IndexedError {
						index: idx,
						hash: headers.get(idx).map(|h| h.hash()),
						error,
					}),
					None => Err(IndexedError {
						index: idx,
						hash: headers.get(idx).map(|h| h.hash()),
						error: ConsensusError::EngineStopped,
					}),
				})
				.collect()
		})
	}
}

fn current_unix_time() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use ubqhash_types::{BlockNumber, ChainConfig, Block, Hash, HeaderBuilder};

	struct MapChain {
		headers: HashMap<Hash, Header>,
	}

	impl ChainReader for MapChain {
		fn get_header(&self, hash: Hash, _number: BlockNumber) -> Option<Header> {
			self.headers.get(&hash).cloned()
		}
		fn get_block(&self, _hash: Hash, _number: BlockNumber) -> Option<Block> {
			None
		}
		fn median_time(&self, block_number: BlockNumber, _parent: &Header) -> u64 {
			// Stable timing: every window step is exactly on-target.
			block_number * 22
		}
		fn config(&self) -> ChainConfig {
			ChainConfig::default()
		}
	}

	fn chained_headers(n: u64) -> (Vec<Header>, MapChain) {
		let genesis = HeaderBuilder::default()
			.number(0)
			.timestamp(1_000_000)
			.difficulty(ubqhash_types::U256::from(131_072u64))
			.gas_limit(8_000_000)
			.build();
		let mut headers = vec![genesis.clone()];
		let mut chain_map = HashMap::new();
		chain_map.insert(genesis.hash(), genesis.clone());

		for i in 1..=n {
			let parent = headers.last().unwrap().clone();
			let header = HeaderBuilder::default()
				.number(i)
				.parent_hash(parent.hash())
				.timestamp(parent.timestamp() + 22)
				.difficulty(parent.difficulty())
				.gas_limit(parent.gas_limit())
				.build();
			chain_map.insert(header.hash(), header.clone());
			headers.push(header);
		}
		(headers, MapChain { headers: chain_map })
	}

	#[test]
	fn batch_results_are_emitted_in_submission_order() {
		let (headers, chain) = chained_headers(5);
		let candidates = headers[1..].to_vec();
		let verifier = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let seals = vec![true; candidates.len()];
		let (_abort_tx, abort_rx) = crossbeam_channel::bounded::<()>(0);
		let results = verifier.verify_batch(&candidates, &seals, abort_rx);
		assert_eq!(results.len(), candidates.len());
		for (i, result) in results.iter().enumerate() {
			assert!(result.is_ok(), "header {} failed: {:?}", i, result);
		}
	}

	#[test]
	fn timestamp_not_increasing_is_rejected() {
		let (headers, chain) = chained_headers(1);
		let parent = headers[0].clone();
		let bad_child = HeaderBuilder::default()
			.number(1)
			.parent_hash(parent.hash())
			.timestamp(parent.timestamp()) // not strictly increasing
			.difficulty(parent.difficulty())
			.gas_limit(parent.gas_limit())
			.build();
		let verifier = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let result = verifier.verify_header(&bad_child, &parent, false, false);
		assert_eq!(
			result,
			Err(ConsensusError::TimestampNotIncreasing {
				found: bad_child.timestamp(),
				parent: parent.timestamp(),
			})
		);
	}

	#[test]
	fn already_known_header_short_circuits_without_rechecking() {
		let (headers, mut chain) = chained_headers(1);
		let parent = headers[0].clone();
		// A header already present in `chain`, but whose declared timestamp
		// would otherwise fail the strictly-increasing check against `parent`.
		let known_but_otherwise_invalid = HeaderBuilder::default()
			.number(1)
			.parent_hash(parent.hash())
			.timestamp(parent.timestamp())
			.difficulty(parent.difficulty())
			.gas_limit(parent.gas_limit())
			.build();
		chain
			.headers
			.insert(known_but_otherwise_invalid.hash(), known_but_otherwise_invalid.clone());
		let verifier = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let result = verifier.verify_header(&known_but_otherwise_invalid, &parent, false, false);
		assert_eq!(result, Ok(()));
	}

	#[test]
	fn already_known_header_short_circuits_in_batch_even_without_a_resolvable_parent() {
		let (headers, mut chain) = chained_headers(1);
		let known = headers[1].clone();
		// Drop the parent from the chain: a fresh lookup would fail with
		// `UnknownAncestor`, but `known` is itself already present.
		chain.headers.remove(&headers[0].hash());
		let verifier = HeaderVerifier::new(Arc::new(chain), PowMode::FullFake);
		let seals = vec![false];
		let (_abort_tx, abort_rx) = crossbeam_channel::bounded::<()>(0);
		let results = verifier.verify_batch(&[known], &seals, abort_rx);
		assert_eq!(results, vec![Ok(())]);
	}
}
