// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! The block header and its seal-hash/block-hash RLP encodings.
//!
//! Field order in [`Header::seal_hash`] is load-bearing: it is exactly the
//! 13-element list spec'd in §4.4, with `mix_digest` and `nonce` excluded.
//! Mutating any of those 13 fields changes the seal hash; mutating
//! `mix_digest` or `nonce` does not.

use rlp::RlpStream;

use crate::{Address, Bloom, Bytes, Hash, U256};

/// Block numbers are unbounded in principle; `u64` is the practical ceiling
/// any real chain will reach, matching the teacher's `BlockNumber` alias.
pub type BlockNumber = u64;

/// An immutable block header.
///
/// Constructed once via [`HeaderBuilder`] and never mutated afterwards,
/// per spec §3's lifecycle note. There are no setters; a header that needs
/// to change is a new header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	parent_hash: Hash,
	uncle_hash: Hash,
	coinbase: Address,
	state_root: Hash,
	tx_root: Hash,
	receipt_root: Hash,
	bloom: Bloom,
	difficulty: U256,
	number: BlockNumber,
	gas_limit: u64,
	gas_used: u64,
	timestamp: u64,
	extra: Bytes,
	mix_digest: Hash,
	nonce: [u8; 8],
}

impl Header {
	/// Hash of the immediate parent.
	pub fn parent_hash(&self) -> Hash {
		self.parent_hash
	}
	/// `Keccak(RLP(uncles))` of this block's uncle headers.
	pub fn uncle_hash(&self) -> Hash {
		self.uncle_hash
	}
	/// The address credited with this block's reward.
	pub fn coinbase(&self) -> Address {
		self.coinbase
	}
	/// Post-execution state root. Opaque to this engine.
	pub fn state_root(&self) -> Hash {
		self.state_root
	}
	/// Transaction trie root. Opaque to this engine.
	pub fn tx_root(&self) -> Hash {
		self.tx_root
	}
	/// Receipt trie root. Opaque to this engine.
	pub fn receipt_root(&self) -> Hash {
		self.receipt_root
	}
	/// Bloom filter over this block's logs. Opaque to this engine.
	pub fn bloom(&self) -> &Bloom {
		&self.bloom
	}
	/// The header's declared difficulty.
	pub fn difficulty(&self) -> U256 {
		self.difficulty
	}
	/// The header's block number.
	pub fn number(&self) -> BlockNumber {
		self.number
	}
	/// The header's gas limit.
	pub fn gas_limit(&self) -> u64 {
		self.gas_limit
	}
	/// Gas consumed by this block's transactions.
	pub fn gas_used(&self) -> u64 {
		self.gas_used
	}
	/// Unix timestamp, in seconds.
	pub fn timestamp(&self) -> u64 {
		self.timestamp
	}
	/// Free-form extra data, bounded by `MAX_EXTRA_SIZE`.
	pub fn extra(&self) -> &[u8] {
		&self.extra
	}
	/// The seal's mix digest, excluded from the seal-hash preimage.
	pub fn mix_digest(&self) -> Hash {
		self.mix_digest
	}
	/// The seal's nonce, excluded from the seal-hash preimage.
	pub fn nonce(&self) -> [u8; 8] {
		self.nonce
	}
	/// The nonce interpreted as a big-endian `u64`.
	pub fn nonce_u64(&self) -> u64 {
		u64::from_be_bytes(self.nonce)
	}

	fn stream_seal_preimage(&self, s: &mut RlpStream) {
		s.begin_list(13);
		s.append(&self.parent_hash);
		s.append(&self.uncle_hash);
		s.append(&self.coinbase);
		s.append(&self.state_root);
		s.append(&self.tx_root);
		s.append(&self.receipt_root);
		s.append(&self.bloom);
		s.append(&self.difficulty);
		s.append(&self.number);
		s.append(&self.gas_limit);
		s.append(&self.gas_used);
		s.append(&self.timestamp);
		s.append(&self.extra);
	}

	/// RLP-encode the 13-field seal preimage (§4.4 step 1).
	pub fn seal_preimage_rlp(&self) -> Bytes {
		let mut s = RlpStream::new();
		self.stream_seal_preimage(&mut s);
		s.out()
	}

	/// Keccak-256 of the seal preimage. This, not [`Header::hash`], is what
	/// the PoW function is evaluated against.
	pub fn seal_hash(&self) -> Hash {
		keccak_hash::keccak(self.seal_preimage_rlp())
	}

	/// Keccak-256 of the fully-sealed header (all 15 fields, including
	/// `mix_digest` and `nonce`). This is the hash used to identify a
	/// concrete, sealed block — e.g. for `ChainReader::get_header` lookups
	/// and parent-hash chaining between batch entries.
	pub fn hash(&self) -> Hash {
		let mut s = RlpStream::new();
		s.begin_list(15);
		s.append(&self.parent_hash);
		s.append(&self.uncle_hash);
		s.append(&self.coinbase);
		s.append(&self.state_root);
		s.append(&self.tx_root);
		s.append(&self.receipt_root);
		s.append(&self.bloom);
		s.append(&self.difficulty);
		s.append(&self.number);
		s.append(&self.gas_limit);
		s.append(&self.gas_used);
		s.append(&self.timestamp);
		s.append(&self.extra);
		s.append(&self.mix_digest);
		s.append(&self.nonce[..].to_vec());
		keccak_hash::keccak(s.out())
	}
}

/// Builder for [`Header`], the only way to construct one.
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
	parent_hash: Hash,
	uncle_hash: Hash,
	coinbase: Address,
	state_root: Hash,
	tx_root: Hash,
	receipt_root: Hash,
	bloom: Bloom,
	difficulty: U256,
	number: BlockNumber,
	gas_limit: u64,
	gas_used: u64,
	timestamp: u64,
	extra: Bytes,
	mix_digest: Hash,
	nonce: [u8; 8],
}

macro_rules! builder_field {
	($name:ident, $ty:ty) => {
		/// Set the corresponding header field.
		pub fn $name(mut self, value: $ty) -> Self {
			self.$name = value;
			self
		}
	};
}

impl HeaderBuilder {
	builder_field!(parent_hash, Hash);
	builder_field!(uncle_hash, Hash);
	builder_field!(coinbase, Address);
	builder_field!(state_root, Hash);
	builder_field!(tx_root, Hash);
	builder_field!(receipt_root, Hash);
	builder_field!(bloom, Bloom);
	builder_field!(difficulty, U256);
	builder_field!(number, BlockNumber);
	builder_field!(gas_limit, u64);
	builder_field!(gas_used, u64);
	builder_field!(timestamp, u64);
	builder_field!(extra, Bytes);
	builder_field!(mix_digest, Hash);
	builder_field!(nonce, [u8; 8]);

	/// Finish building. There is no validation here — field-level rule
	/// checking is `HeaderVerifier`'s job, not the type's.
	pub fn build(self) -> Header {
		Header {
			parent_hash: self.parent_hash,
			uncle_hash: self.uncle_hash,
			coinbase: self.coinbase,
			state_root: self.state_root,
			tx_root: self.tx_root,
			receipt_root: self.receipt_root,
			bloom: self.bloom,
			difficulty: self.difficulty,
			number: self.number,
			gas_limit: self.gas_limit,
			gas_used: self.gas_used,
			timestamp: self.timestamp,
			extra: self.extra,
			mix_digest: self.mix_digest,
			nonce: self.nonce,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Header {
		HeaderBuilder::default()
			.number(100)
			.timestamp(1_600_000_000)
			.difficulty(U256::from(131_072))
			.gas_limit(8_000_000)
			.build()
	}

	#[test]
	fn seal_hash_excludes_mix_digest_and_nonce() {
		let h1 = sample();
		let mut h2 = sample();
		// Rebuild with a different mix_digest/nonce: seal hash must be unchanged.
		h2 = HeaderBuilder::default()
			.number(h2.number())
			.timestamp(h2.timestamp())
			.difficulty(h2.difficulty())
			.gas_limit(h2.gas_limit())
			.mix_digest(Hash::from_low_u64_be(7))
			.nonce([1, 2, 3, 4, 5, 6, 7, 8])
			.build();
		assert_eq!(h1.seal_hash(), h2.seal_hash());
		assert_ne!(h1.hash(), h2.hash());
	}

	#[test]
	fn seal_hash_changes_with_any_of_the_thirteen_fields() {
		let base = sample();
		let mutated = HeaderBuilder::default()
			.number(base.number())
			.timestamp(base.timestamp())
			.difficulty(base.difficulty())
			.gas_limit(base.gas_limit())
			.gas_used(1) // only this changed
			.build();
		assert_ne!(base.seal_hash(), mutated.seal_hash());
	}
}
