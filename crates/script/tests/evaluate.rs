//! End-to-end evaluation scenarios combining unlocking and locking
//! scripts, including real signature checks.

use num_bigint::BigUint;
use rbtc_crypto::ecdsa::{PrivateKey, Signature};
use rbtc_crypto::secp256k1::S256Point;
use rbtc_script::opcodes::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use rbtc_script::{Cmd, Script};

fn biguint(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).unwrap()
}

/// The signature element a real script carries: DER plus a sighash byte.
fn sig_element(sig: &Signature) -> Vec<u8> {
    let mut element = sig.der();
    element.push(0x01); // SIGHASH_ALL
    element
}

#[test]
fn p2pk_checksig_accepts_a_valid_signature() {
    let z = biguint("ec208baa0fc1c19f708a9ca96fdeff3ac3f230bb4a7ba4aede4942ad003c0f60");
    let point = S256Point::new(
        biguint("887387e452b8eacc4acfde10d9aaf7f6d9a0f975aabb10d006e4da568744d06c"),
        biguint("61de6d95231cd89026e286df3b6ae4a894a3378e393e93a0f45b666329a0ae34"),
    )
    .unwrap();
    let sig = Signature::new(
        biguint("ac8d1c87e51d0d441be8b3dd5b05c8795b48875dffe00b7ffcfac23010d3a395"),
        biguint("68342ceff8935ededd102dd876ffd6ba72d6a427a3edb13d26eb0781cb423c4"),
    );

    let script_pubkey = Script::new(vec![
        Cmd::Push(point.sec(false).unwrap()),
        Cmd::Op(OP_CHECKSIG),
    ])
    .unwrap();
    let script_sig = Script::new(vec![Cmd::Push(sig_element(&sig))]).unwrap();

    let combined = script_sig + script_pubkey;
    assert!(combined.evaluate(&z));

    let wrong_z = &z + 1u32;
    assert!(!combined.evaluate(&wrong_z));
}

#[test]
fn p2pkh_unlocks_with_key_and_signature() {
    let key = PrivateKey::new(biguint("8675309")).unwrap();
    let z = biguint("7c076ff316692a3d7eb3c3bb0f8b1488cf72e1afcd929e29307032997a838a3d");
    let sig = key.sign(&z).unwrap();
    let sec = key.point().sec(true).unwrap();
    let pubkey_hash = key.point().hash160(true).unwrap();

    let script_pubkey = Script::new(vec![
        Cmd::Op(OP_DUP),
        Cmd::Op(OP_HASH160),
        Cmd::Push(pubkey_hash.to_vec()),
        Cmd::Op(OP_EQUALVERIFY),
        Cmd::Op(OP_CHECKSIG),
    ])
    .unwrap();
    let script_sig = Script::new(vec![
        Cmd::Push(sig_element(&sig)),
        Cmd::Push(sec),
    ])
    .unwrap();

    assert!((script_sig.clone() + script_pubkey.clone()).evaluate(&z));

    // A signature over a different hash must not unlock the output.
    let other_sig = key.sign(&(&z + 1u32)).unwrap();
    let bad_sig = Script::new(vec![
        Cmd::Push(sig_element(&other_sig)),
        Cmd::Push(key.point().sec(true).unwrap()),
    ])
    .unwrap();
    assert!(!(bad_sig + script_pubkey.clone()).evaluate(&z));

    // The wrong key fails at OP_EQUALVERIFY.
    let other_key = PrivateKey::new(biguint("fedcba")).unwrap();
    let other_unlock = Script::new(vec![
        Cmd::Push(sig_element(&other_key.sign(&z).unwrap())),
        Cmd::Push(other_key.point().sec(true).unwrap()),
    ])
    .unwrap();
    assert!(!(other_unlock + script_pubkey).evaluate(&z));
}

#[test]
fn alt_stack_survives_across_commands() {
    use rbtc_script::opcodes::{OP_ADD, OP_EQUAL, OP_FROMALTSTACK, OP_TOALTSTACK};

    // 7 parked on the alt stack comes back after the addition
    let script = Script::new(vec![
        Cmd::Op(0x57),
        Cmd::Op(OP_TOALTSTACK),
        Cmd::Op(0x52),
        Cmd::Op(0x53),
        Cmd::Op(OP_ADD),
        Cmd::Op(OP_FROMALTSTACK),
        Cmd::Op(0x57),
        Cmd::Op(OP_EQUAL),
    ])
    .unwrap();
    assert!(script.evaluate(&BigUint::from(0u32)));
}
