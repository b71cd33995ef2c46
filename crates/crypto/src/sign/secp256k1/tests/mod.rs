// Path: crates/crypto/src/sign/secp256k1/tests/mod.rs
use super::*;
use alloy_primitives::{keccak256, Parity};

// Well-known development keys. Never fund these.
const HARDHAT_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const HARDHAT_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const EIP155_KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";

fn key_pair(hex_key: &str) -> Secp256k1KeyPair {
    let key = ScopedKey::from_slice(&hex::decode(hex_key).unwrap()).unwrap();
    Secp256k1KeyPair::from_scoped_key(&key).unwrap()
}

#[test]
fn test_address_derivation() {
    let pair = key_pair(HARDHAT_KEY);
    assert_eq!(pair.address().unwrap().to_string(), HARDHAT_ADDRESS);
    assert_eq!(
        key_pair(EIP155_KEY).address().unwrap().to_string(),
        "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"
    );
}

#[test]
fn test_deterministic_signature_matches_reference() {
    // Signing hash of the EIP-155 example transaction.
    let prehash: B256 = "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        .parse()
        .unwrap();
    let pair = key_pair(EIP155_KEY);
    let sig = pair.sign_prehash(&prehash).unwrap();
    assert_eq!(
        sig.r(),
        "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"
            .parse::<U256>()
            .unwrap()
    );
    assert_eq!(
        sig.s(),
        "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            .parse::<U256>()
            .unwrap()
    );
    assert!(!sig.v().y_parity());
    assert_eq!(pair.sign_prehash(&prehash).unwrap(), sig);
}

#[test]
fn test_recover_round_trip_with_generated_key() {
    let pair = Secp256k1KeyPair::generate();
    let prehash = keccak256(b"awardPoints");
    let sig = pair.sign_prehash(&prehash).unwrap();
    assert_eq!(recover_address(&prehash, &sig).unwrap(), pair.address().unwrap());

    let exported = pair.to_scoped_key();
    let reloaded = Secp256k1KeyPair::from_scoped_key(&exported).unwrap();
    assert_eq!(reloaded.address().unwrap(), pair.address().unwrap());
}

#[test]
fn test_recover_rejects_high_s() {
    let pair = key_pair(HARDHAT_KEY);
    let prehash = keccak256(b"payload");
    let sig = pair.sign_prehash(&prehash).unwrap();
    let order: U256 = "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        .parse()
        .unwrap();
    let flipped = Signature::from_rs_and_parity(sig.r(), order - sig.s(), Parity::Parity(!sig.v().y_parity())).unwrap();
    assert!(recover_address(&prehash, &flipped).is_err());
}

#[test]
fn test_rejects_invalid_scalars() {
    let zero = ScopedKey::new([0u8; 32]);
    assert!(matches!(
        Secp256k1KeyPair::from_scoped_key(&zero),
        Err(CryptoError::InvalidKey(_))
    ));
    let above_order = ScopedKey::new([0xff; 32]);
    assert!(Secp256k1KeyPair::from_scoped_key(&above_order).is_err());
}

#[test]
fn test_debug_does_not_print_key() {
    let pair = key_pair(HARDHAT_KEY);
    let rendered = format!("{:?}", pair);
    assert!(!rendered.contains("ac0974"));
    assert!(rendered.to_lowercase().contains("f39fd6e5"));
}
