use crate::alphabet::{Alphabet, Symbol, PADDING};
use crate::chunked::{Decoder, Encoder};
use crate::error::DecodeError;
use std::sync::Arc;

pub(crate) const INPUT_BLOCK_SIZE: usize = 5;
const MAX_REMAINDER_SIZE: usize = INPUT_BLOCK_SIZE - 1;
pub(crate) const OUTPUT_BLOCK_SIZE: usize = 4;

#[derive(Debug, Clone)]
struct EncodingConfig {
    strict: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Encodes bytes into emoji and back using a given [`Alphabet`].
///
/// Every 5 input bytes become 4 symbols. A final group of 1 to 4 bytes still
/// produces 4 symbols, the unused ones being padding.
///
/// ```
/// # use ecoji::{Alphabet, Encoding};
/// # fn alphabet() -> Alphabet {
/// #     let symbols: Vec<u32> = (0x1f000..0x1f400).collect();
/// #     Alphabet::from_codepoints(&symbols, [0x269c, 0x1f400, 0x1f401, 0x1f402]).unwrap()
/// # }
/// let encoding = Encoding::new(alphabet());
///
/// let encoded = encoding.encode("hello");
/// assert_eq!(4, encoded.chars().count());
/// assert_eq!(b"hello".to_vec(), encoding.decode(&encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Encoding {
    alphabet: Arc<Alphabet>,
    config: EncodingConfig,
}

pub struct EncodingBuilder {
    alphabet: Arc<Alphabet>,
    config: EncodingConfig,
}

impl EncodingBuilder {
    /// Whether decoding rejects final groups whose discarded low bits are not
    /// zero. Enabled by default.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn build(self) -> Encoding {
        Encoding {
            alphabet: self.alphabet,
            config: self.config,
        }
    }
}

/// Maps 1 to 5 input bytes to one group of symbols.
pub(crate) fn encode_group(alphabet: &Alphabet, chunk: &[u8]) -> [char; OUTPUT_BLOCK_SIZE] {
    debug_assert!(!chunk.is_empty() && chunk.len() <= INPUT_BLOCK_SIZE);

    // Each block is 5 bytes or 40 bits, split into four 10 bits values used as
    // index into the alphabet. Missing input bytes are zero.
    //
    //     0        1        2        3        4
    //  01234567 89012345 67890123 45678901 23456789
    // +--------+--------+--------+--------+--------+
    // |<    1    ><    2    ><    3    ><    4    >|
    // +--------+--------+--------+--------+--------+
    let mut block = [0_u8; INPUT_BLOCK_SIZE];
    block[..chunk.len()].copy_from_slice(chunk);
    let [b0, b1, b2, b3, b4] = block.map(u16::from);

    let values = [
        b0 << 2 | b1 >> 6,
        (b1 & 0b00111111) << 4 | b2 >> 4,
        (b2 & 0b00001111) << 6 | b3 >> 2,
        (b3 & 0b00000011) << 8 | b4,
    ];

    // 1, 2 and 3 bytes are covered by as many symbols, the rest is filler.
    // 4 bytes need 3 symbols plus 2 bits, carried by the tail padding.
    let mut symbols = [PADDING; OUTPUT_BLOCK_SIZE];
    let used = if chunk.len() == INPUT_BLOCK_SIZE {
        OUTPUT_BLOCK_SIZE
    } else {
        chunk.len().min(OUTPUT_BLOCK_SIZE - 1)
    };
    for (symbol, &value) in symbols.iter_mut().zip(&values).take(used) {
        *symbol = alphabet.symbol(value);
    }
    if chunk.len() == MAX_REMAINDER_SIZE {
        symbols[3] = alphabet.tail_padding(block[3]);
    }

    symbols
}

/// Turns one group of symbols back into bytes, appending them to `output`.
///
/// `position` is the index of the group's first symbol in the whole input.
/// Only the last group of an input may contain padding.
pub(crate) fn decode_group(
    group: &[Symbol; OUTPUT_BLOCK_SIZE],
    is_last: bool,
    position: usize,
    strict: bool,
    output: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    use Symbol::{Data, Fill, Tail};

    let first_padding = group.iter().position(|s| s.is_padding());
    if let Some(i) = first_padding {
        if !is_last {
            return Err(DecodeError::MisplacedPadding(position + i));
        }
    }

    // (values, number of output bytes, symbol whose low bits were zero filled
    // by the encoder along with their mask)
    let (values, len, filled) = match *group {
        [Data(v0), Data(v1), Data(v2), Data(v3)] => ([v0, v1, v2, v3], 5, None),
        [Data(v0), Data(v1), Data(v2), Tail(bits)] => ([v0, v1, v2, u16::from(bits) << 8], 4, None),
        [Data(v0), Data(v1), Data(v2), Fill] => ([v0, v1, v2, 0], 3, Some((2, 0b111111))),
        [Data(v0), Data(v1), Fill, Fill] => ([v0, v1, 0, 0], 2, Some((1, 0b1111))),
        [Data(v0), Fill, Fill, Fill] => ([v0, 0, 0, 0], 1, Some((0, 0b11))),
        // End of stream marker.
        [Fill, Fill, Fill, Fill] => return Ok(()),
        _ => {
            let i = first_padding.unwrap_or_default();
            return Err(DecodeError::TruncatedGroup(position + i));
        }
    };

    if let Some((i, mask)) = filled {
        if strict && values[i] & mask != 0 {
            return Err(DecodeError::NonZeroPaddingBits(position + i));
        }
    }

    let [v0, v1, v2, v3] = values;
    let block = [
        (v0 >> 2) as u8,
        ((v0 & 0b0000000011) << 6 | v1 >> 4) as u8,
        ((v1 & 0b0000001111) << 4 | v2 >> 6) as u8,
        ((v2 & 0b0000111111) << 2 | v3 >> 8) as u8,
        (v3 & 0b0011111111) as u8,
    ];
    output.extend_from_slice(&block[..len]);

    Ok(())
}

impl Encoding {
    pub fn new(alphabet: impl Into<Arc<Alphabet>>) -> Self {
        Self::builder(alphabet).build()
    }

    pub fn builder(alphabet: impl Into<Arc<Alphabet>>) -> EncodingBuilder {
        EncodingBuilder {
            alphabet: alphabet.into(),
            config: EncodingConfig::default(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of symbols (not bytes) produced by encoding `n` bytes.
    pub fn encoded_len(&self, n: usize) -> usize {
        let max_whole_input_bytes = n + MAX_REMAINDER_SIZE;
        max_whole_input_bytes / INPUT_BLOCK_SIZE * OUTPUT_BLOCK_SIZE
    }

    /// Upper bound of the number of bytes decoded from `n` symbols.
    pub fn decoded_len_max(&self, n: usize) -> usize {
        n / OUTPUT_BLOCK_SIZE * INPUT_BLOCK_SIZE
    }

    pub fn encode<T: ?Sized + AsRef<[u8]>>(&self, input: &T) -> String {
        let data = input.as_ref();
        // Most symbols take 4 bytes in UTF-8.
        let mut output = String::with_capacity(self.encoded_len(data.len()) * 4);
        self.encode_into(data, &mut output);
        output
    }

    /// Appends the encoding of `input` to `output`.
    pub fn encode_into(&self, input: &[u8], output: &mut String) {
        for chunk in input.chunks(INPUT_BLOCK_SIZE) {
            output.extend(encode_group(&self.alphabet, chunk));
        }
    }

    pub fn encode_to_chars<T: ?Sized + AsRef<[u8]>>(&self, input: &T) -> Vec<char> {
        let data = input.as_ref();
        let mut output = Vec::with_capacity(self.encoded_len(data.len()));
        for chunk in data.chunks(INPUT_BLOCK_SIZE) {
            output.extend(encode_group(&self.alphabet, chunk));
        }
        output
    }

    pub fn decode<T: ?Sized + AsRef<str>>(&self, input: &T) -> Result<Vec<u8>, DecodeError> {
        self.decode_chars(input.as_ref().chars())
    }

    /// Decodes a sequence of symbols.
    ///
    /// The length is checked first, then every symbol, then the groups in
    /// order. Nothing is returned unless the whole input is valid.
    pub fn decode_chars<I: IntoIterator<Item = char>>(&self, input: I) -> Result<Vec<u8>, DecodeError> {
        let chars: Vec<char> = input.into_iter().collect();
        if chars.len() % OUTPUT_BLOCK_SIZE != 0 {
            return Err(DecodeError::InvalidLength(chars.len()));
        }

        let symbols = chars
            .iter()
            .enumerate()
            .map(|(position, &c)| {
                self.alphabet
                    .classify(c)
                    .ok_or(DecodeError::InvalidSymbol { symbol: c, position })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut output = Vec::with_capacity(self.decoded_len_max(symbols.len()));
        let groups = symbols.len() / OUTPUT_BLOCK_SIZE;
        for (i, group) in symbols.chunks_exact(OUTPUT_BLOCK_SIZE).enumerate() {
            let group = [group[0], group[1], group[2], group[3]];
            decode_group(
                &group,
                i + 1 == groups,
                i * OUTPUT_BLOCK_SIZE,
                self.config.strict,
                &mut output,
            )?;
        }

        Ok(output)
    }

    /// Appends the decoding of `input` to `output`, returning the number of
    /// bytes appended. `output` is left untouched on error.
    pub fn decode_into(&self, input: &str, output: &mut Vec<u8>) -> Result<usize, DecodeError> {
        let decoded = self.decode(input)?;
        output.extend_from_slice(&decoded);
        Ok(decoded.len())
    }

    /// Returns an encoder accepting its input in several chunks.
    pub fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.alphabet)
    }

    /// Returns a decoder accepting its input in several chunks.
    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.alphabet, self.config.strict)
    }
}
