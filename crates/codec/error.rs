use thiserror::Error;

/// Wire-framing errors shared by every type that implements the
/// [`WireEncode`](crate::encode::WireEncode) /
/// [`WireDecode`](crate::decode::WireDecode) pair.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("Unexpected end of input{}", fmt_ctx(.0))]
    UnexpectedEof(Option<&'static str>),
    #[error("Trailing bytes after decoded value{}", fmt_ctx(.0))]
    TrailingBytes(Option<&'static str>),
    #[error("Integer too large for varint encoding: {0:#x}")]
    VarintOverflow(u128),
    #[error("Declared length does not match bytes consumed{}", fmt_ctx(.0))]
    LengthMismatch(Option<&'static str>),
    #[error("Data push of {0} bytes exceeds the 520-byte element limit")]
    OversizedPush(usize),
}

fn fmt_ctx(ctx: &Option<&'static str>) -> String {
    ctx.map(|c| format!(" decoding {c}")).unwrap_or_default()
}

impl CodecError {
    pub fn unexpected_eof() -> Self {
        Self::UnexpectedEof(None)
    }

    pub fn trailing_bytes() -> Self {
        Self::TrailingBytes(None)
    }

    pub fn length_mismatch() -> Self {
        Self::LengthMismatch(None)
    }

    pub fn with_context(self, ctx: &'static str) -> Self {
        match self {
            Self::UnexpectedEof(_) => Self::UnexpectedEof(Some(ctx)),
            Self::TrailingBytes(_) => Self::TrailingBytes(Some(ctx)),
            Self::LengthMismatch(_) => Self::LengthMismatch(Some(ctx)),
            other => other,
        }
    }
}
