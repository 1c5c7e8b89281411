use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AbiDecodeError {
    #[error("Invalid ABI length{}", fmt_ctx(.0))]
    InvalidLength(Option<&'static str>),
    #[error("Malformed ABI data{}", fmt_ctx(.0))]
    MalformedData(Option<&'static str>),
    #[error("Value out of range for {0}")]
    ValueOutOfRange(String),
    #[error("Invalid ABI type: {0}")]
    InvalidType(String),
    #[error("Invalid UTF-8 in ABI string")]
    InvalidUtf8,
    #[error("Unexpected ABI value, expected {0}")]
    UnexpectedValue(&'static str),
}

fn fmt_ctx(ctx: &Option<&'static str>) -> String {
    ctx.map(|c| format!(" decoding {c}")).unwrap_or_default()
}

impl AbiDecodeError {
    pub fn invalid_length() -> Self {
        Self::InvalidLength(None)
    }

    pub fn malformed_data() -> Self {
        Self::MalformedData(None)
    }

    pub fn with_context(self, ctx: &'static str) -> Self {
        match self {
            Self::InvalidLength(_) => Self::InvalidLength(Some(ctx)),
            Self::MalformedData(_) => Self::MalformedData(Some(ctx)),
            other => other,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AbiEncodeError {
    #[error("Fixed bytes value is {0} bytes long, at most 32 are allowed")]
    FixedBytesTooLong(usize),
}
