//! EIP-712 building blocks shared by the message codec.
//!
//! These helpers provide:
//! - Domain separator computation for a `name`/`version`/`chainId` domain
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI word encoder for the field types PoWo messages use

use alloy_primitives::{keccak256, Address, B256, U256};

/// Type string of the signing domain. Only the fields the domain carries are listed.
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";

/// Prefix separating EIP-712 digests from other keccak256 signing schemes.
pub const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// Compute the EIP-712 domain hash
/// (keccak256(abi.encode(typeHash, nameHash, versionHash, chainId))).
pub fn compute_domain_hash(name: &str, version: &str, chain_id: u64) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_string(name);
	enc.push_string(version);
	enc.push_u256(U256::from(chain_id));
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.extend_from_slice(&DIGEST_PREFIX);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder producing the 32-byte words of an EIP-712 struct encoding.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	/// Addresses are encoded as their 20 raw bytes left-padded to a full word.
	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	/// Dynamic `string` values are replaced by the keccak256 of their UTF-8 bytes.
	pub fn push_string(&mut self, s: &str) {
		self.push_b256(&keccak256(s.as_bytes()));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
