//! # rbtc-script
//!
//! Bitcoin Script: the command model, wire framing and a stack-machine
//! evaluator for the legacy opcode subset.
//!
//! A [`Script`] is an ordered sequence of [`Cmd`]s — opcodes or data
//! pushes. Evaluation runs the commands against a caller-supplied
//! signature hash `z` and reduces to a single boolean, mirroring
//! consensus semantics: the reason for a failure is never reported,
//! only logged.
//!
//! ```rust
//! use num_bigint::BigUint;
//! use rbtc_script::{Cmd, Script};
//! use rbtc_script::opcodes::{OP_ADD, OP_EQUAL};
//!
//! // 2 3 OP_ADD 5 OP_EQUAL
//! let script = Script::new(vec![
//!     Cmd::Op(0x52),
//!     Cmd::Op(0x53),
//!     Cmd::Op(OP_ADD),
//!     Cmd::Op(0x55),
//!     Cmd::Op(OP_EQUAL),
//! ])
//! .unwrap();
//! assert!(script.evaluate(&BigUint::from(0u32)));
//! ```

pub mod num;
pub mod opcodes;

use bytes::BufMut;
use num_bigint::BigUint;
use tracing::debug;

use rbtc_codec::decode::{WireDecode, read_bytes, read_u8, read_u16_le, read_u32_le};
use rbtc_codec::encode::WireEncode;
use rbtc_codec::error::CodecError;
use rbtc_codec::varint::{read_varint, write_varint};

use crate::opcodes::{OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4, Stack, execute, op_name};

/// Stack elements may not exceed 520 bytes.
pub const MAX_ELEMENT_SIZE: usize = 520;

/// One script command: an opcode byte or an opaque data push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Op(u8),
    Push(Vec<u8>),
}

/// An ordered sequence of commands with the Bitcoin wire framing.
///
/// Construction and parsing both enforce the 520-byte element limit, so
/// serialization of any `Script` in circulation cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    cmds: Vec<Cmd>,
}

impl Script {
    pub fn new(cmds: Vec<Cmd>) -> Result<Self, CodecError> {
        for cmd in &cmds {
            if let Cmd::Push(data) = cmd {
                if data.len() >= MAX_ELEMENT_SIZE {
                    return Err(CodecError::OversizedPush(data.len()));
                }
            }
        }
        Ok(Self { cmds })
    }

    pub fn cmds(&self) -> &[Cmd] {
        &self.cmds
    }

    /// The command stream without the varint length framing.
    pub fn raw_serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for cmd in &self.cmds {
            match cmd {
                Cmd::Op(op) => out.push(*op),
                Cmd::Push(data) => {
                    // Shortest prefix: direct length, PUSHDATA1, PUSHDATA2.
                    let length = data.len();
                    if length <= 75 {
                        out.push(length as u8);
                    } else if length <= 255 {
                        out.push(OP_PUSHDATA1);
                        out.push(length as u8);
                    } else {
                        out.push(OP_PUSHDATA2);
                        out.extend_from_slice(&(length as u16).to_le_bytes());
                    }
                    out.extend_from_slice(data);
                }
            }
        }
        out
    }

    /// Runs the command stream against the signature hash `z`.
    ///
    /// Succeeds iff every opcode handler succeeds and the final stack's
    /// top element is non-empty.
    pub fn evaluate(&self, z: &BigUint) -> bool {
        let mut stack = Stack::new();
        let mut alt_stack = Stack::new();
        for cmd in &self.cmds {
            match cmd {
                Cmd::Push(data) => stack.push(data.clone()),
                Cmd::Op(op) => {
                    if !execute(*op, &mut stack, &mut alt_stack, z) {
                        debug!(opcode = op_name(*op), "script opcode failed");
                        return false;
                    }
                }
            }
        }
        match stack.last() {
            Some(top) => !top.is_empty(),
            None => false,
        }
    }
}

/// Concatenation: unlocking script + locking script.
impl std::ops::Add for Script {
    type Output = Script;

    fn add(mut self, mut other: Script) -> Script {
        self.cmds.append(&mut other.cmds);
        self
    }
}

impl WireEncode for Script {
    fn encode(&self, buf: &mut dyn BufMut) {
        let raw = self.raw_serialize();
        write_varint(raw.len() as u64, buf);
        buf.put_slice(&raw);
    }
}

impl WireDecode for Script {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (length, rest) = read_varint(buf)?;
        let length = usize::try_from(length).map_err(|_| CodecError::unexpected_eof())?;
        let (mut body, rest) = read_bytes(rest, length).map_err(|e| e.with_context("script"))?;

        let mut cmds = Vec::new();
        while let Some((&prefix, after)) = body.split_first() {
            body = after;
            let push_length = match prefix {
                1..=75 => Some(usize::from(prefix)),
                OP_PUSHDATA1 => {
                    let (len, after) = read_length_field(body, read_u8)?;
                    body = after;
                    Some(usize::from(len))
                }
                OP_PUSHDATA2 => {
                    let (len, after) = read_length_field(body, read_u16_le)?;
                    body = after;
                    Some(usize::from(len))
                }
                OP_PUSHDATA4 => {
                    let (len, after) = read_length_field(body, read_u32_le)?;
                    body = after;
                    Some(len as usize)
                }
                _ => None,
            };
            match push_length {
                Some(push_length) => {
                    if push_length >= MAX_ELEMENT_SIZE {
                        return Err(CodecError::OversizedPush(push_length));
                    }
                    let (data, after) = read_bytes(body, push_length)
                        .map_err(|_| CodecError::LengthMismatch(Some("script")))?;
                    cmds.push(Cmd::Push(data.to_vec()));
                    body = after;
                }
                None => cmds.push(Cmd::Op(prefix)),
            }
        }
        Ok((Self { cmds }, rest))
    }
}

// A push-length field cut short means the declared script length lied.
fn read_length_field<T>(
    buf: &[u8],
    reader: fn(&[u8]) -> Result<(T, &[u8]), CodecError>,
) -> Result<(T, &[u8]), CodecError> {
    reader(buf).map_err(|_| CodecError::LengthMismatch(Some("script")))
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for cmd in &self.cmds {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match cmd {
                Cmd::Op(op) => write!(f, "{}", op_name(*op))?,
                Cmd::Push(data) => {
                    for byte in data {
                        write!(f, "{byte:02x}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
