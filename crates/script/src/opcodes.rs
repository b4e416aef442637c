//! Opcode handlers and dispatch for the script evaluator.
//!
//! Each handler consumes exactly the operands it needs — the stack, the
//! alt-stack, or the signature hash — and reports success with a `bool`.
//! Insufficient or malformed operands make the handler fail, which aborts
//! the whole evaluation.

use num_bigint::BigUint;
use rbtc_crypto::ecdsa::Signature;
use rbtc_crypto::hash::{hash160, hash256, ripemd160, sha1, sha256};
use rbtc_crypto::secp256k1::S256Point;

use crate::num::{decode_num, encode_num};

/// Script runtime stack: a sequence of opaque byte strings.
pub type Stack = Vec<Vec<u8>>;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_3DUP: u8 = 0x6f;
pub const OP_2OVER: u8 = 0x70;
pub const OP_2ROT: u8 = 0x71;
pub const OP_2SWAP: u8 = 0x72;
pub const OP_IFDUP: u8 = 0x73;
pub const OP_DEPTH: u8 = 0x74;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_NIP: u8 = 0x77;
pub const OP_OVER: u8 = 0x78;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_ROT: u8 = 0x7b;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_TUCK: u8 = 0x7d;
pub const OP_SIZE: u8 = 0x82;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;
pub const OP_NEGATE: u8 = 0x8f;
pub const OP_ABS: u8 = 0x90;
pub const OP_NOT: u8 = 0x91;
pub const OP_0NOTEQUAL: u8 = 0x92;
pub const OP_ADD: u8 = 0x93;
pub const OP_SUB: u8 = 0x94;
pub const OP_MUL: u8 = 0x95;
pub const OP_BOOLAND: u8 = 0x9a;
pub const OP_BOOLOR: u8 = 0x9b;
pub const OP_NUMEQUAL: u8 = 0x9c;
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;
pub const OP_NUMNOTEQUAL: u8 = 0x9e;
pub const OP_LESSTHAN: u8 = 0x9f;
pub const OP_GREATERTHAN: u8 = 0xa0;
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;
pub const OP_MIN: u8 = 0xa3;
pub const OP_MAX: u8 = 0xa4;
pub const OP_WITHIN: u8 = 0xa5;
pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;

/// Dispatches one opcode against the evaluation state.
///
/// Opcodes outside the supported set (control flow, multisig, the
/// reserved ranges) fail the evaluation.
pub(crate) fn execute(op: u8, stack: &mut Stack, alt_stack: &mut Stack, z: &BigUint) -> bool {
    match op {
        OP_0 => op_n(stack, 0),
        OP_1NEGATE => op_n(stack, -1),
        OP_1..=OP_16 => op_n(stack, i64::from(op - OP_1) + 1),
        OP_NOP => true,
        OP_VERIFY => op_verify(stack),
        OP_RETURN => false,
        OP_TOALTSTACK => op_toaltstack(stack, alt_stack),
        OP_FROMALTSTACK => op_fromaltstack(stack, alt_stack),
        OP_2DROP => op_2drop(stack),
        OP_2DUP => op_2dup(stack),
        OP_3DUP => op_3dup(stack),
        OP_2OVER => op_2over(stack),
        OP_2ROT => op_2rot(stack),
        OP_2SWAP => op_2swap(stack),
        OP_IFDUP => op_ifdup(stack),
        OP_DEPTH => op_depth(stack),
        OP_DROP => op_drop(stack),
        OP_DUP => op_dup(stack),
        OP_NIP => op_nip(stack),
        OP_OVER => op_over(stack),
        OP_PICK => op_pick(stack),
        OP_ROLL => op_roll(stack),
        OP_ROT => op_rot(stack),
        OP_SWAP => op_swap(stack),
        OP_TUCK => op_tuck(stack),
        OP_SIZE => op_size(stack),
        OP_EQUAL => op_equal(stack),
        OP_EQUALVERIFY => op_equal(stack) && op_verify(stack),
        OP_1ADD => op_unary(stack, |a| a.checked_add(1)),
        OP_1SUB => op_unary(stack, |a| a.checked_sub(1)),
        OP_NEGATE => op_unary(stack, i64::checked_neg),
        OP_ABS => op_unary(stack, i64::checked_abs),
        OP_NOT => op_unary(stack, |a| Some(i64::from(a == 0))),
        OP_0NOTEQUAL => op_unary(stack, |a| Some(i64::from(a != 0))),
        OP_ADD => op_binary(stack, |top, second| top.checked_add(second)),
        OP_SUB => op_binary(stack, |top, second| top.checked_sub(second)),
        OP_MUL => op_binary(stack, |top, second| top.checked_mul(second)),
        OP_BOOLAND => op_binary(stack, |top, second| {
            Some(i64::from(top != 0 && second != 0))
        }),
        OP_BOOLOR => op_binary(stack, |top, second| {
            Some(i64::from(top != 0 || second != 0))
        }),
        OP_NUMEQUAL => op_binary(stack, |top, second| Some(i64::from(second == top))),
        OP_NUMEQUALVERIFY => {
            op_binary(stack, |top, second| Some(i64::from(second == top))) && op_verify(stack)
        }
        OP_NUMNOTEQUAL => op_binary(stack, |top, second| Some(i64::from(second != top))),
        OP_LESSTHAN => op_binary(stack, |top, second| Some(i64::from(second < top))),
        OP_GREATERTHAN => op_binary(stack, |top, second| Some(i64::from(second > top))),
        OP_LESSTHANOREQUAL => op_binary(stack, |top, second| Some(i64::from(second <= top))),
        OP_GREATERTHANOREQUAL => op_binary(stack, |top, second| Some(i64::from(second >= top))),
        OP_MIN => op_binary(stack, |top, second| Some(second.min(top))),
        OP_MAX => op_binary(stack, |top, second| Some(second.max(top))),
        OP_WITHIN => op_within(stack),
        OP_RIPEMD160 => op_hash(stack, |data| ripemd160(data).to_vec()),
        OP_SHA1 => op_hash(stack, |data| sha1(data).to_vec()),
        OP_SHA256 => op_hash(stack, |data| sha256(data).to_vec()),
        OP_HASH160 => op_hash(stack, |data| hash160(data).to_vec()),
        OP_HASH256 => op_hash(stack, |data| hash256(data).to_vec()),
        OP_CHECKSIG => op_checksig(stack, z),
        OP_CHECKSIGVERIFY => op_checksig(stack, z) && op_verify(stack),
        _ => false,
    }
}

/// Human-readable opcode name, for failure logs.
pub fn op_name(op: u8) -> &'static str {
    match op {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1NEGATE => "OP_1NEGATE",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        OP_16 => "OP_16",
        OP_NOP => "OP_NOP",
        OP_VERIFY => "OP_VERIFY",
        OP_RETURN => "OP_RETURN",
        OP_TOALTSTACK => "OP_TOALTSTACK",
        OP_FROMALTSTACK => "OP_FROMALTSTACK",
        OP_2DROP => "OP_2DROP",
        OP_2DUP => "OP_2DUP",
        OP_3DUP => "OP_3DUP",
        OP_2OVER => "OP_2OVER",
        OP_2ROT => "OP_2ROT",
        OP_2SWAP => "OP_2SWAP",
        OP_IFDUP => "OP_IFDUP",
        OP_DEPTH => "OP_DEPTH",
        OP_DROP => "OP_DROP",
        OP_DUP => "OP_DUP",
        OP_NIP => "OP_NIP",
        OP_OVER => "OP_OVER",
        OP_PICK => "OP_PICK",
        OP_ROLL => "OP_ROLL",
        OP_ROT => "OP_ROT",
        OP_SWAP => "OP_SWAP",
        OP_TUCK => "OP_TUCK",
        OP_SIZE => "OP_SIZE",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_1ADD => "OP_1ADD",
        OP_1SUB => "OP_1SUB",
        OP_NEGATE => "OP_NEGATE",
        OP_ABS => "OP_ABS",
        OP_NOT => "OP_NOT",
        OP_0NOTEQUAL => "OP_0NOTEQUAL",
        OP_ADD => "OP_ADD",
        OP_SUB => "OP_SUB",
        OP_MUL => "OP_MUL",
        OP_BOOLAND => "OP_BOOLAND",
        OP_BOOLOR => "OP_BOOLOR",
        OP_NUMEQUAL => "OP_NUMEQUAL",
        OP_NUMEQUALVERIFY => "OP_NUMEQUALVERIFY",
        OP_NUMNOTEQUAL => "OP_NUMNOTEQUAL",
        OP_LESSTHAN => "OP_LESSTHAN",
        OP_GREATERTHAN => "OP_GREATERTHAN",
        OP_LESSTHANOREQUAL => "OP_LESSTHANOREQUAL",
        OP_GREATERTHANOREQUAL => "OP_GREATERTHANOREQUAL",
        OP_MIN => "OP_MIN",
        OP_MAX => "OP_MAX",
        OP_WITHIN => "OP_WITHIN",
        OP_RIPEMD160 => "OP_RIPEMD160",
        OP_SHA1 => "OP_SHA1",
        OP_SHA256 => "OP_SHA256",
        OP_HASH160 => "OP_HASH160",
        OP_HASH256 => "OP_HASH256",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        _ => "OP_UNKNOWN",
    }
}

fn pop_num(stack: &mut Stack) -> Option<i64> {
    let element = stack.pop()?;
    decode_num(&element)
}

// ── Constants ──────────────────────────────────────────────────────────

fn op_n(stack: &mut Stack, n: i64) -> bool {
    stack.push(encode_num(n));
    true
}

// ── Flow ───────────────────────────────────────────────────────────────

fn op_verify(stack: &mut Stack) -> bool {
    matches!(pop_num(stack), Some(value) if value != 0)
}

// ── Alt-stack ──────────────────────────────────────────────────────────

fn op_toaltstack(stack: &mut Stack, alt_stack: &mut Stack) -> bool {
    match stack.pop() {
        Some(element) => {
            alt_stack.push(element);
            true
        }
        None => false,
    }
}

fn op_fromaltstack(stack: &mut Stack, alt_stack: &mut Stack) -> bool {
    match alt_stack.pop() {
        Some(element) => {
            stack.push(element);
            true
        }
        None => false,
    }
}

// ── Stack manipulation ─────────────────────────────────────────────────

fn op_ifdup(stack: &mut Stack) -> bool {
    let Some(top) = stack.last().cloned() else {
        return false;
    };
    if decode_num(&top) != Some(0) {
        stack.push(top);
    }
    true
}

fn op_depth(stack: &mut Stack) -> bool {
    stack.push(encode_num(stack.len() as i64));
    true
}

fn op_drop(stack: &mut Stack) -> bool {
    stack.pop().is_some()
}

fn op_dup(stack: &mut Stack) -> bool {
    let Some(top) = stack.last().cloned() else {
        return false;
    };
    stack.push(top);
    true
}

fn op_nip(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    stack.swap_remove(stack.len() - 2);
    true
}

fn op_over(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let second = stack[stack.len() - 2].clone();
    stack.push(second);
    true
}

fn op_pick(stack: &mut Stack) -> bool {
    let Some(n) = pop_num(stack) else {
        return false;
    };
    let Ok(n) = usize::try_from(n) else {
        return false;
    };
    if stack.len() < n + 1 {
        return false;
    }
    let item = stack[n].clone();
    stack.push(item);
    true
}

fn op_roll(stack: &mut Stack) -> bool {
    let Some(n) = pop_num(stack) else {
        return false;
    };
    let Ok(n) = usize::try_from(n) else {
        return false;
    };
    if stack.len() < n + 1 {
        return false;
    }
    let item = stack.remove(n);
    stack.push(item);
    true
}

fn op_rot(stack: &mut Stack) -> bool {
    if stack.len() < 3 {
        return false;
    }
    let item = stack.remove(stack.len() - 3);
    stack.push(item);
    true
}

fn op_swap(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 2 {
        return false;
    }
    stack.swap(len - 1, len - 2);
    true
}

fn op_tuck(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let top = stack[stack.len() - 1].clone();
    stack.insert(stack.len() - 2, top);
    true
}

fn op_2drop(stack: &mut Stack) -> bool {
    if stack.len() < 2 {
        return false;
    }
    stack.truncate(stack.len() - 2);
    true
}

fn op_2dup(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 2 {
        return false;
    }
    stack.push(stack[len - 2].clone());
    stack.push(stack[len - 1].clone());
    true
}

fn op_3dup(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 3 {
        return false;
    }
    stack.push(stack[len - 3].clone());
    stack.push(stack[len - 2].clone());
    stack.push(stack[len - 1].clone());
    true
}

fn op_2over(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 4 {
        return false;
    }
    stack.push(stack[len - 4].clone());
    stack.push(stack[len - 3].clone());
    true
}

fn op_2rot(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 6 {
        return false;
    }
    let mut rotated = stack.split_off(len - 6);
    rotated.rotate_left(2);
    stack.append(&mut rotated);
    true
}

fn op_2swap(stack: &mut Stack) -> bool {
    let len = stack.len();
    if len < 4 {
        return false;
    }
    stack.swap(len - 1, len - 3);
    stack.swap(len - 2, len - 4);
    true
}

// ── Size and equality ──────────────────────────────────────────────────

fn op_size(stack: &mut Stack) -> bool {
    let Some(length) = stack.last().map(Vec::len) else {
        return false;
    };
    stack.push(encode_num(length as i64));
    true
}

fn op_equal(stack: &mut Stack) -> bool {
    let (Some(top), Some(second)) = (stack.pop(), stack.pop()) else {
        return false;
    };
    stack.push(encode_num(i64::from(top == second)));
    true
}

// ── Arithmetic ─────────────────────────────────────────────────────────

fn op_unary(stack: &mut Stack, f: impl FnOnce(i64) -> Option<i64>) -> bool {
    let Some(value) = pop_num(stack) else {
        return false;
    };
    match f(value) {
        Some(result) => {
            stack.push(encode_num(result));
            true
        }
        None => false,
    }
}

/// Pops the top element, then the second; overflow fails the handler.
fn op_binary(stack: &mut Stack, f: impl FnOnce(i64, i64) -> Option<i64>) -> bool {
    let Some(top) = pop_num(stack) else {
        return false;
    };
    let Some(second) = pop_num(stack) else {
        return false;
    };
    match f(top, second) {
        Some(result) => {
            stack.push(encode_num(result));
            true
        }
        None => false,
    }
}

fn op_within(stack: &mut Stack) -> bool {
    let (Some(max), Some(min), Some(value)) =
        (pop_num(stack), pop_num(stack), pop_num(stack))
    else {
        return false;
    };
    stack.push(encode_num(i64::from(min <= value && value < max)));
    true
}

// ── Hashing ────────────────────────────────────────────────────────────

fn op_hash(stack: &mut Stack, hasher: impl FnOnce(&[u8]) -> Vec<u8>) -> bool {
    match stack.pop() {
        Some(element) => {
            stack.push(hasher(&element));
            true
        }
        None => false,
    }
}

// ── Signature checking ─────────────────────────────────────────────────

fn op_checksig(stack: &mut Stack, z: &BigUint) -> bool {
    let (Some(sec), Some(sig_bytes)) = (stack.pop(), stack.pop()) else {
        return false;
    };
    let Ok(pubkey) = S256Point::parse(&sec) else {
        return false;
    };
    // The last byte of the element is the sighash type, not DER data.
    let Some((_, der)) = sig_bytes.split_last() else {
        return false;
    };
    let Ok(sig) = Signature::parse(der) else {
        return false;
    };
    stack.push(encode_num(i64::from(pubkey.verify(z, &sig))));
    true
}
