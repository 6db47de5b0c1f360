use crate::error::AlphabetError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number of data symbols, one per 10-bit value.
pub const ALPHABET_SIZE: usize = 1024;

/// Filler used in the unused slots of a final group holding 1 to 3 bytes.
pub const PADDING: char = '\u{2615}';

/// Tail padding for a final 4 byte group whose last byte ends in `0b00`.
///
/// It is not part of emoji lists, the other three tail paddings are.
pub const TAIL_PADDING_0: char = '\u{269C}';

const TAIL_PADDINGS: usize = 4;

// Emoji lists carry the three remaining tail paddings in-line, at these
// positions (each applied after the previous removal).
const LIST_TAIL_POSITIONS: [usize; TAIL_PADDINGS - 1] = [256, 512, 768];
const LIST_SIZE: usize = ALPHABET_SIZE + LIST_TAIL_POSITIONS.len();

/// What a single codepoint means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A data symbol carrying a 10-bit value.
    Data(u16),
    /// The [`PADDING`] filler.
    Fill,
    /// A tail padding carrying the 2 low bits of the last byte.
    Tail(u8),
}

impl Symbol {
    pub fn is_padding(self) -> bool {
        !matches!(self, Symbol::Data(_))
    }
}

/// An immutable, validated emoji alphabet.
///
/// Holds the 1024 data symbols in value order, the four tail paddings and a
/// reverse index. The union of data symbols, tail paddings and [`PADDING`] is
/// always exactly 1029 distinct codepoints.
#[derive(Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
    tail: [char; TAIL_PADDINGS],
    reverse: HashMap<char, u16>,
}

impl Alphabet {
    /// Builds an alphabet from its 1024 data symbols and four tail paddings.
    ///
    /// `tail[k]` is used when the last byte of a 4 byte final group ends in
    /// the bits `k`.
    pub fn new(symbols: &[char], tail: [char; TAIL_PADDINGS]) -> Result<Self, AlphabetError> {
        if symbols.len() != ALPHABET_SIZE {
            return Err(AlphabetError::InvalidLength {
                actual: symbols.len(),
                expected: ALPHABET_SIZE,
            });
        }

        let mut reverse = HashMap::with_capacity(ALPHABET_SIZE);
        for (value, &c) in (0_u16..).zip(symbols) {
            if c == PADDING || reverse.insert(c, value).is_some() {
                return Err(AlphabetError::DuplicateSymbol(c));
            }
        }

        for (i, &c) in tail.iter().enumerate() {
            if c == PADDING || reverse.contains_key(&c) || tail[..i].contains(&c) {
                return Err(AlphabetError::DuplicateSymbol(c));
            }
        }

        tracing::debug!(
            first = ?symbols[0],
            last = ?symbols[ALPHABET_SIZE - 1],
            ?tail,
            "built alphabet"
        );

        Ok(Self {
            symbols: symbols.to_vec(),
            tail,
            reverse,
        })
    }

    /// Same as [`Alphabet::new`] but takes raw codepoints, rejecting anything
    /// that is not a Unicode scalar value.
    pub fn from_codepoints(symbols: &[u32], tail: [u32; TAIL_PADDINGS]) -> Result<Self, AlphabetError> {
        let symbols = symbols
            .iter()
            .map(|&code| to_char(code))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tail_chars = [PADDING; TAIL_PADDINGS];
        for (c, &code) in tail_chars.iter_mut().zip(&tail) {
            *c = to_char(code)?;
        }

        Self::new(&symbols, tail_chars)
    }

    /// Parses an emoji list: one hexadecimal codepoint per line, optionally
    /// prefixed with `0x` or `U+`. Blank lines and lines starting with `#`
    /// are skipped.
    ///
    /// The list has 1027 entries. The entries at positions 256, 512 and 768
    /// (removed in that order) are the tail paddings 1 to 3, tail padding 0
    /// is [`TAIL_PADDING_0`] and the remaining 1024 entries are the data
    /// symbols.
    pub fn from_emoji_list(text: &str) -> Result<Self, AlphabetError> {
        let mut list = Vec::with_capacity(LIST_SIZE);

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let digits = ["0x", "0X", "U+", "u+"]
                .iter()
                .find_map(|prefix| line.strip_prefix(*prefix))
                .unwrap_or(line);

            let code = u32::from_str_radix(digits, 16).map_err(|_| AlphabetError::Malformed {
                line: i + 1,
                text: line.to_string(),
            })?;
            list.push(to_char(code)?);
        }

        Self::from_list(list)
    }

    fn from_list(mut list: Vec<char>) -> Result<Self, AlphabetError> {
        if list.len() != LIST_SIZE {
            return Err(AlphabetError::InvalidLength {
                actual: list.len(),
                expected: LIST_SIZE,
            });
        }

        let mut tail = [TAIL_PADDING_0; TAIL_PADDINGS];
        for (c, &position) in tail[1..].iter_mut().zip(&LIST_TAIL_POSITIONS) {
            *c = list.remove(position);
        }

        Self::new(&list, tail)
    }

    /// Returns the symbol for a 10-bit value. Bits above the 10th are ignored.
    pub fn symbol(&self, value: u16) -> char {
        self.symbols[usize::from(value & 0x3ff)]
    }

    /// Returns the 10-bit value of a data symbol, or `None` for anything else
    /// (padding included).
    pub fn value_of(&self, c: char) -> Option<u16> {
        self.reverse.get(&c).copied()
    }

    pub fn is_valid_symbol(&self, c: char) -> bool {
        self.classify(c).is_some()
    }

    pub fn classify(&self, c: char) -> Option<Symbol> {
        if let Some(value) = self.value_of(c) {
            return Some(Symbol::Data(value));
        }
        if c == PADDING {
            return Some(Symbol::Fill);
        }

        self.tail.iter().position(|&t| t == c).map(|k| Symbol::Tail(k as u8))
    }

    pub fn padding(&self) -> char {
        PADDING
    }

    /// Returns the tail padding for the low 2 bits of `bits`.
    pub fn tail_padding(&self, bits: u8) -> char {
        self.tail[usize::from(bits & 0b11)]
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl FromStr for Alphabet {
    type Err = AlphabetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_emoji_list(s)
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("first", &self.symbols[0])
            .field("last", &self.symbols[ALPHABET_SIZE - 1])
            .field("tail", &self.tail)
            .finish_non_exhaustive()
    }
}

fn to_char(code: u32) -> Result<char, AlphabetError> {
    char::from_u32(code).ok_or(AlphabetError::InvalidCodepoint(code))
}

/// An alphabet of consecutive codepoints from U+1F000, laid out like the
/// emoji list so that encodings sort in the same order as their input.
#[cfg(test)]
pub(crate) fn sorted_test_alphabet() -> Alphabet {
    let list = (0x1f000..0x1f000 + LIST_SIZE as u32)
        .map(|code| char::from_u32(code).unwrap())
        .collect();

    Alphabet::from_list(list).unwrap()
}
