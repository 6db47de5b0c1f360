//! Base-1024 binary-to-text encoding with an emoji alphabet.
//!
//! Every 5 bytes of input become 4 symbols of a 1024 symbols alphabet. The
//! alphabet itself is not part of this crate: it is loaded from an emoji list
//! with [`Alphabet::from_emoji_list`] or built with [`Alphabet::new`], then
//! handed to an [`Encoding`].

pub mod alphabet;
mod chunked;
mod codec;
mod error;
mod stream;

pub use alphabet::{Alphabet, Symbol, PADDING, TAIL_PADDING_0};
pub use chunked::{Decoder, Encoder};
pub use codec::{Encoding, EncodingBuilder};
pub use error::{AlphabetError, DecodeError, StreamError};
