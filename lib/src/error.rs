use std::io;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AlphabetError {
    #[error("invalid alphabet length {actual}, expected {expected}")]
    InvalidLength { actual: usize, expected: usize },
    #[error("duplicate symbol {0:?}")]
    DuplicateSymbol(char),
    #[error("invalid codepoint {0:#x}")]
    InvalidCodepoint(u32),
    #[error("unable to parse line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}

/// Errors returned when decoding symbols back into bytes.
///
/// Positions count symbols (Unicode scalar values) from the start of the
/// input, not bytes.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid length {0}, must be a multiple of 4")]
    InvalidLength(usize),
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("padding symbol at position {0} is not in the last group")]
    MisplacedPadding(usize),
    #[error("non-zero padding bits in symbol at position {0}")]
    NonZeroPaddingBits(usize),
    #[error("malformed final group at position {0}")]
    TruncatedGroup(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
