// Copyright 2024 Ubiq developers.
// This file is part of the ubqhash consensus engine.

// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! JSON-RPC-compatible surface over `ubqhash_consensus::MinerApi` (§4.7,
//! §6): `eth_getWork`, `eth_submitWork`, `eth_submitHashrate`,
//! `eth_hashrate`, matching the wire method names of the Ethereum family
//! this engine descends from.

use std::sync::Arc;

use jsonrpc_core::{Error as RpcError, ErrorCode, Result as RpcResult};
use jsonrpc_derive::rpc;
use rustc_hex::FromHex;

use ubqhash_consensus::MinerApi;
use ubqhash_types::{ConsensusError, Hash};

/// The external miner-facing RPC contract.
#[rpc]
pub trait MinerRpc {
	/// `eth_getWork`: `[seal_hash_hex, seed_hash_hex, boundary_hex, number_hex]`.
	#[rpc(name = "eth_getWork")]
	fn get_work(&self) -> RpcResult<[String; 4]>;

	/// `eth_submitWork`: `(nonce_hex, seal_hash_hex, mix_digest_hex) -> bool`.
	#[rpc(name = "eth_submitWork")]
	fn submit_work(&self, nonce: String, seal_hash: String, mix_digest: String) -> RpcResult<bool>;

	/// `eth_submitHashrate`: `(rate_hex, id_hex) -> bool`.
	#[rpc(name = "eth_submitHashrate")]
	fn submit_hashrate(&self, rate: String, id: String) -> RpcResult<bool>;

	/// `eth_hashrate`: aggregate hashrate across every remote, as a plain `u64`.
	#[rpc(name = "eth_hashrate")]
	fn hashrate(&self) -> RpcResult<u64>;
}

/// The concrete handler, wrapping a shared [`MinerApi`].
pub struct MinerRpcHandler {
	api: Arc<MinerApi>,
}

impl MinerRpcHandler {
	/// Wrap `api` for JSON-RPC dispatch.
	pub fn new(api: Arc<MinerApi>) -> Self {
		MinerRpcHandler { api }
	}
}

impl MinerRpc for MinerRpcHandler {
	fn get_work(&self) -> RpcResult<[String; 4]> {
		let work = self.api.fetch_work().map_err(consensus_to_rpc_error)?;
		Ok([
			format!("0x{:x}", work.seal_hash),
			format!("0x{:x}", work.seed_hash),
			format!("0x{:x}", work.boundary),
			format!("0x{:x}", work.block_number),
		])
	}

	fn submit_work(&self, nonce: String, seal_hash: String, mix_digest: String) -> RpcResult<bool> {
		let nonce = parse_nonce(&nonce)?;
		let seal_hash = parse_hash(&seal_hash)?;
		let mix_digest = parse_hash(&mix_digest)?;
		self.api
			.submit_work(nonce, seal_hash, mix_digest)
			.map_err(consensus_to_rpc_error)
	}

	fn submit_hashrate(&self, rate: String, id: String) -> RpcResult<bool> {
		let rate = parse_u64(&rate)?;
		self.api
			.submit_hashrate(id, rate)
			.map_err(consensus_to_rpc_error)
	}

	fn hashrate(&self) -> RpcResult<u64> {
		Ok(self.api.hashrate())
	}
}

fn consensus_to_rpc_error(error: ConsensusError) -> RpcError {
	match error {
		ConsensusError::EngineStopped => RpcError {
			code: ErrorCode::ServerError(-32000),
			message: "engine stopped".into(),
			data: None,
		},
		ConsensusError::NotSupported => RpcError {
			code: ErrorCode::ServerError(-32001),
			message: "not supported".into(),
			data: None,
		},
		other => RpcError {
			code: ErrorCode::InvalidParams,
			message: other.to_string(),
			data: None,
		},
	}
}

fn parse_hash(hex: &str) -> RpcResult<Hash> {
	let hex = hex.trim_start_matches("0x");
	let bytes: Vec<u8> = hex.from_hex().map_err(|_| invalid_params("malformed hex"))?;
	if bytes.len() != 32 {
		return Err(invalid_params("expected a 32-byte hash"));
	}
	let mut buf = [0u8; 32];
	buf.copy_from_slice(&bytes);
	Ok(Hash::from(buf))
}

fn parse_nonce(hex: &str) -> RpcResult<[u8; 8]> {
	let hex = hex.trim_start_matches("0x");
	let bytes: Vec<u8> = hex.from_hex().map_err(|_| invalid_params("malformed hex"))?;
	if bytes.len() != 8 {
		return Err(invalid_params("expected an 8-byte nonce"));
	}
	let mut buf = [0u8; 8];
	buf.copy_from_slice(&bytes);
	Ok(buf)
}

fn parse_u64(hex: &str) -> RpcResult<u64> {
	let hex = hex.trim_start_matches("0x");
	u64::from_str_radix(hex, 16).map_err(|_| invalid_params("malformed hex integer"))
}

fn invalid_params(message: &str) -> RpcError {
	RpcError {
		code: ErrorCode::InvalidParams,
		message: message.into(),
		data: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ubqhash_consensus::ExitSignal;
	use ubqhash_pow::PowMode;
	use ubqhash_types::HeaderBuilder;

	fn handler() -> MinerRpcHandler {
		let (exit, _closer) = ExitSignal::new();
		let mode = PowMode::Test(Arc::new(ubqhash_pow::NullOracle::tiny()));
		let api = Arc::new(MinerApi::new(mode, exit));
		let header = HeaderBuilder::default()
			.number(1)
			.difficulty(ubqhash_types::U256::from(131_072u64))
			.build();
		api.set_work(header, Hash::zero());
		MinerRpcHandler::new(api)
	}

	#[test]
	fn get_work_returns_four_hex_words() {
		let handler = handler();
		let work = handler.get_work().unwrap();
		assert_eq!(work.len(), 4);
		assert!(work[0].starts_with("0x"));
	}

	#[test]
	fn hashrate_starts_at_zero() {
		let handler = handler();
		assert_eq!(handler.hashrate().unwrap(), 0);
	}

	#[test]
	fn submit_hashrate_then_reflected_in_hashrate() {
		let handler = handler();
		assert!(handler.submit_hashrate("0x64".into(), "0x1".into()).unwrap());
		assert_eq!(handler.hashrate().unwrap(), 100);
	}
}
