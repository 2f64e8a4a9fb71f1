// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! `Block` pairs a [`Header`] with its uncles. Transaction and receipt
//! bodies are outside this engine's scope (EVM execution is a Non-goal);
//! they are carried as opaque blobs purely so the type is structurally
//! complete, per spec §3's data model.

use rlp::RlpStream;

use crate::Header;

/// An opaque, unparsed transaction or receipt body. The engine never looks
/// inside these — only `uncle_hash`'s RLP-of-uncles invariant is checked.
pub type OpaqueBody = Vec<u8>;

/// A block: a header plus the uncle headers it declares.
///
/// Invariant: `header.uncle_hash() == Keccak(RLP(uncles))` and
/// `uncles.len() <= MAX_UNCLES`. Neither is enforced by the constructor;
/// `UncleVerifier` is what checks them against a candidate block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	header: Header,
	uncles: Vec<Header>,
	transactions: Vec<OpaqueBody>,
	receipts: Vec<OpaqueBody>,
}

impl Block {
	/// Assemble a block from its parts. Does not validate the uncle-hash
	/// invariant; use [`Block::uncle_hash_matches`] for that.
	pub fn new(
		header: Header,
		uncles: Vec<Header>,
		transactions: Vec<OpaqueBody>,
		receipts: Vec<OpaqueBody>,
	) -> Self {
		Block {
			header,
			uncles,
			transactions,
			receipts,
		}
	}

	/// The block's header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// The block's declared uncle headers.
	pub fn uncles(&self) -> &[Header] {
		&self.uncles
	}

	/// Opaque transaction bodies, uninterpreted by this engine.
	pub fn transactions(&self) -> &[OpaqueBody] {
		&self.transactions
	}

	/// Opaque receipt bodies, uninterpreted by this engine.
	pub fn receipts(&self) -> &[OpaqueBody] {
		&self.receipts
	}

	/// `Keccak(RLP(uncles))`, independent of what `header.uncle_hash()` claims.
	pub fn compute_uncle_hash(&self) -> crate::Hash {
		let mut s = RlpStream::new_list(self.uncles.len());
		for uncle in &self.uncles {
			s.append_raw(&rlp_encode_header(uncle), 1);
		}
		keccak_hash::keccak(s.out())
	}

	/// Whether `header.uncle_hash()` matches the actual uncle list.
	pub fn uncle_hash_matches(&self) -> bool {
		self.header.uncle_hash() == self.compute_uncle_hash()
	}
}

/// Full RLP encoding of a sealed header (used only for `uncle_hash`
/// computation here; verification logic uses `Header::hash`/`seal_hash`
/// directly).
fn rlp_encode_header(header: &Header) -> Vec<u8> {
	let mut s = RlpStream::new_list(15);
	s.append(&header.parent_hash());
	s.append(&header.uncle_hash());
	s.append(&header.coinbase());
	s.append(&header.state_root());
	s.append(&header.tx_root());
	s.append(&header.receipt_root());
	s.append(header.bloom());
	s.append(&header.difficulty());
	s.append(&header.number());
	s.append(&header.gas_limit());
	s.append(&header.gas_used());
	s.append(&header.timestamp());
	s.append(&header.extra());
	s.append(&header.mix_digest());
	s.append(&header.nonce()[..].to_vec());
	s.out()
}
