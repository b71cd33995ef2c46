// Path: crates/tx/src/codec.rs
//! The EIP-155 legacy transaction envelope.
//!
//! Signing payload: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`.
//! Signed envelope: `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`
//! with `v = y_parity + 35 + 2 * chainId`.

use crate::error::CodecError;
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_primitives::{keccak256, Address, Bytes, Signature, TxKind, B256, U256};
use ecopoints_crypto::recover_address;
use ecopoints_types::app::{Account, UnsignedTransaction};
use ecopoints_types::error::SigningError;

/// The consensus form of `tx`, bound to its chain id.
pub fn legacy(tx: &UnsignedTransaction) -> TxLegacy {
    TxLegacy {
        chain_id: Some(tx.chain_id),
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit.into(),
        to: TxKind::Call(tx.to.address()),
        value: U256::from(tx.value),
        input: tx.data.clone(),
    }
}

/// The EIP-155 signing hash.
pub fn signing_hash(tx: &UnsignedTransaction) -> B256 {
    legacy(tx).signature_hash()
}

/// Encodes the signed envelope.
///
/// `signature` may carry a bare parity bit; `v` is always written in its
/// EIP-155 form for the transaction's chain id.
pub fn encode_signed(
    tx: &UnsignedTransaction,
    signature: &Signature,
) -> Result<Vec<u8>, SigningError> {
    if tx.chain_id > (u64::MAX - 36) / 2 {
        return Err(SigningError::MalformedTransaction(format!(
            "chain id {} is too large",
            tx.chain_id
        )));
    }
    let signature = signature.with_chain_id(tx.chain_id);
    let mut raw = Vec::new();
    legacy(tx).encode_with_signature_fields(&signature, &mut raw);
    Ok(raw)
}

/// A decoded signed legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Destination, `None` for contract creation.
    pub to: Option<Address>,
    /// Transferred wei.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
    /// The chain id carried in `v`, `None` for pre-EIP-155 signatures.
    pub chain_id: Option<u64>,
    /// The account recovered from the signature.
    pub sender: Account,
    /// `keccak256` of the raw envelope.
    pub hash: B256,
}

/// Decodes a signed legacy envelope and recovers its sender.
pub fn decode_signed(raw: &[u8]) -> Result<DecodedTransaction, CodecError> {
    let mut buf = raw;
    let signed = TxLegacy::decode_signed_fields(&mut buf)?;
    if !buf.is_empty() {
        return Err(CodecError::TrailingBytes);
    }

    let tx = signed.tx();
    let sender = recover_address(&tx.signature_hash(), signed.signature())
        .map_err(|e| CodecError::Signature(e.to_string()))?;
    let gas_limit = u64::try_from(tx.gas_limit)
        .map_err(|_| CodecError::Rlp("gas limit exceeds 64 bits".into()))?;
    let to = match tx.to {
        TxKind::Call(address) => Some(address),
        TxKind::Create => None,
    };

    Ok(DecodedTransaction {
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit,
        to,
        value: tx.value,
        data: tx.input.clone(),
        chain_id: tx.chain_id,
        sender,
        hash: keccak256(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecopoints_api::crypto::ScopedKey;
    use ecopoints_crypto::Secp256k1KeyPair;
    use ecopoints_types::app::validate;

    // The example transaction from EIP-155.
    const SIGNING_HASH: &str = "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53";
    const SIGNED: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn example() -> UnsignedTransaction {
        UnsignedTransaction {
            from: validate("0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F").unwrap(),
            to: validate("0x3535353535353535353535353535353535353535").unwrap(),
            data: Bytes::new(),
            gas_limit: 21_000,
            gas_price: 20_000_000_000,
            nonce: 9,
            value: 1_000_000_000_000_000_000,
            chain_id: 1,
        }
    }

    fn example_key() -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_scoped_key(&ScopedKey::new([0x46; 32])).unwrap()
    }

    #[test]
    fn test_signing_hash_matches_reference() {
        assert_eq!(hex::encode(signing_hash(&example())), SIGNING_HASH);
    }

    #[test]
    fn test_signed_envelope_matches_reference() {
        let tx = example();
        let signature = example_key().sign_prehash(&signing_hash(&tx)).unwrap();
        let raw = encode_signed(&tx, &signature).unwrap();
        assert_eq!(hex::encode(&raw), SIGNED);
    }

    #[test]
    fn test_decode_and_recover_reference() {
        let raw = hex::decode(SIGNED).unwrap();
        let decoded = decode_signed(&raw).unwrap();
        let tx = example();
        assert_eq!(decoded.nonce, 9);
        assert_eq!(decoded.gas_limit, 21_000);
        assert_eq!(decoded.gas_price, 20_000_000_000);
        assert_eq!(decoded.to, Some(tx.to.address()));
        assert_eq!(decoded.chain_id, Some(1));
        assert_eq!(decoded.sender, tx.from);
        assert_eq!(decoded.hash, keccak256(&raw));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let raw = hex::decode(SIGNED).unwrap();
        let mut extended = raw.clone();
        extended.push(0x00);
        assert!(decode_signed(&extended).is_err());
        assert!(decode_signed(&raw[..raw.len() - 1]).is_err());
        assert!(decode_signed(&[0x82, 0x01, 0x02]).is_err());
    }

    #[test]
    fn test_oversized_chain_id_is_refused() {
        let mut tx = example();
        tx.chain_id = u64::MAX;
        let signature = example_key().sign_prehash(&signing_hash(&tx)).unwrap();
        assert!(matches!(
            encode_signed(&tx, &signature),
            Err(SigningError::MalformedTransaction(_))
        ));
    }
}
