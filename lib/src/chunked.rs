use crate::alphabet::{Alphabet, Symbol};
use crate::codec::{decode_group, encode_group, INPUT_BLOCK_SIZE, OUTPUT_BLOCK_SIZE};
use crate::error::DecodeError;

/// Encodes input given in arbitrary chunks.
///
/// Bytes that do not fill a whole group are kept until the next call to
/// [`Encoder::update`] or to [`Encoder::finish`], so the output is the same
/// as encoding the concatenated input at once.
pub struct Encoder<'a> {
    alphabet: &'a Alphabet,
    buf: [u8; INPUT_BLOCK_SIZE],
    len: usize,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(alphabet: &'a Alphabet) -> Self {
        Self {
            alphabet,
            buf: [0; INPUT_BLOCK_SIZE],
            len: 0,
        }
    }

    pub fn update(&mut self, mut input: &[u8], output: &mut String) {
        if self.len > 0 {
            let n = (INPUT_BLOCK_SIZE - self.len).min(input.len());
            self.buf[self.len..self.len + n].copy_from_slice(&input[..n]);
            self.len += n;
            input = &input[n..];

            if self.len < INPUT_BLOCK_SIZE {
                return;
            }
            output.extend(encode_group(self.alphabet, &self.buf));
            self.len = 0;
        }

        let mut chunks = input.chunks_exact(INPUT_BLOCK_SIZE);
        for chunk in &mut chunks {
            output.extend(encode_group(self.alphabet, chunk));
        }

        let remainder = chunks.remainder();
        self.buf[..remainder.len()].copy_from_slice(remainder);
        self.len = remainder.len();
    }

    /// Writes the final, possibly padded, group.
    pub fn finish(self, output: &mut String) {
        if self.len > 0 {
            output.extend(encode_group(self.alphabet, &self.buf[..self.len]));
        }
    }
}

/// Decodes input given in arbitrary chunks.
///
/// Symbols are checked as they arrive. The most recent complete group is held
/// back until more input or [`Decoder::finish`] tells whether it is the last
/// one, since only the last group may be padded.
///
/// Unlike [`crate::Encoding::decode`], bytes of earlier groups have already
/// been written out when an error is returned. The decoder must not be used
/// after an error.
pub struct Decoder<'a> {
    alphabet: &'a Alphabet,
    strict: bool,
    partial: [Symbol; OUTPUT_BLOCK_SIZE],
    partial_len: usize,
    held: Option<[Symbol; OUTPUT_BLOCK_SIZE]>,
    position: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(alphabet: &'a Alphabet, strict: bool) -> Self {
        Self {
            alphabet,
            strict,
            partial: [Symbol::Fill; OUTPUT_BLOCK_SIZE],
            partial_len: 0,
            held: None,
            position: 0,
        }
    }

    pub fn update(&mut self, input: &str, output: &mut Vec<u8>) -> Result<(), DecodeError> {
        self.update_chars(input.chars(), output)
    }

    pub fn update_chars<I: IntoIterator<Item = char>>(
        &mut self,
        input: I,
        output: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        for c in input {
            let symbol = self.alphabet.classify(c).ok_or(DecodeError::InvalidSymbol {
                symbol: c,
                position: self.position,
            })?;

            self.partial[self.partial_len] = symbol;
            self.partial_len += 1;
            self.position += 1;

            if self.partial_len == OUTPUT_BLOCK_SIZE {
                if let Some(held) = self.held.take() {
                    let held_at = self.position - 2 * OUTPUT_BLOCK_SIZE;
                    decode_group(&held, false, held_at, self.strict, output)?;
                }
                self.held = Some(self.partial);
                self.partial_len = 0;
            }
        }

        Ok(())
    }

    /// Decodes the last group.
    pub fn finish(self, output: &mut Vec<u8>) -> Result<(), DecodeError> {
        if self.partial_len != 0 {
            return Err(DecodeError::InvalidLength(self.position));
        }

        match self.held {
            Some(held) => {
                let held_at = self.position - OUTPUT_BLOCK_SIZE;
                decode_group(&held, true, held_at, self.strict, output)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::alphabet::{sorted_test_alphabet, PADDING};
    use crate::error::DecodeError;
    use crate::Encoding;
    use claim::{assert_err, assert_ok};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn split_randomly<'a>(rng: &mut StdRng, mut data: &'a [u8]) -> Vec<&'a [u8]> {
        let mut chunks = Vec::new();
        while !data.is_empty() {
            let n = rng.random_range(0..=data.len().min(13));
            let (chunk, rest) = data.split_at(n);
            chunks.push(chunk);
            data = rest;
        }
        chunks
    }

    #[test]
    fn chunked_encoding_should_match_one_shot_encoding() {
        let encoding = Encoding::new(sorted_test_alphabet());
        let mut rng = StdRng::seed_from_u64(7);

        for len in 0..200 {
            let mut input = vec![0_u8; len];
            rng.fill(&mut input[..]);

            let mut encoder = encoding.encoder();
            let mut output = String::new();
            for chunk in split_randomly(&mut rng, &input) {
                encoder.update(chunk, &mut output);
            }
            encoder.finish(&mut output);

            assert_eq!(encoding.encode(&input), output);
        }
    }

    #[test]
    fn chunked_decoding_should_match_one_shot_decoding() {
        let encoding = Encoding::new(sorted_test_alphabet());
        let mut rng = StdRng::seed_from_u64(8);

        for len in 0..200 {
            let mut input = vec![0_u8; len];
            rng.fill(&mut input[..]);
            let encoded = encoding.encode_to_chars(&input);

            let mut decoder = encoding.decoder();
            let mut output = Vec::new();
            let mut rest = &encoded[..];
            while !rest.is_empty() {
                let n = rng.random_range(0..=rest.len().min(9));
                assert_ok!(decoder.update_chars(rest[..n].iter().copied(), &mut output));
                rest = &rest[n..];
            }
            assert_ok!(decoder.finish(&mut output));

            assert_eq!(input, output);
        }
    }

    #[test]
    fn decoder_should_report_stream_positions() {
        let encoding = Encoding::new(sorted_test_alphabet());
        let encoded = encoding.encode("hello world");

        let mut decoder = encoding.decoder();
        let mut output = Vec::new();
        assert_ok!(decoder.update(&encoded, &mut output));
        let result = decoder.update("ab", &mut output);
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidSymbol {
                symbol: 'a',
                position: 12
            }
        );
    }

    #[test]
    fn decoder_should_reject_padding_before_the_last_group() {
        let encoding = Encoding::new(sorted_test_alphabet());

        let mut decoder = encoding.decoder();
        let mut output = Vec::new();
        assert_ok!(decoder.update(&encoding.encode("hello!"), &mut output));
        // The padded group is only rejected once another group follows it.
        assert_eq!(b"hello".to_vec(), output);

        let result = decoder.update(&encoding.encode("abcde"), &mut output);
        assert_eq!(result.unwrap_err(), DecodeError::MisplacedPadding(5));
    }

    #[test]
    fn decoder_should_reject_incomplete_groups() {
        let encoding = Encoding::new(sorted_test_alphabet());

        let mut decoder = encoding.decoder();
        let mut output = Vec::new();
        assert_ok!(decoder.update(&encoding.encode("hello"), &mut output));
        assert_ok!(decoder.update_chars([PADDING; 2], &mut output));

        assert_eq!(decoder.finish(&mut output).unwrap_err(), DecodeError::InvalidLength(6));
    }

    #[test]
    fn decoder_should_check_the_last_group() {
        let encoding = Encoding::new(sorted_test_alphabet());
        let symbol = encoding.alphabet().symbol(1021);

        let mut decoder = encoding.decoder();
        let mut output = Vec::new();
        assert_ok!(decoder.update_chars([symbol, PADDING, PADDING, PADDING], &mut output));
        assert_err!(decoder.finish(&mut output));
    }
}
