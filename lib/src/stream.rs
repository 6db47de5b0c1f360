use crate::codec::Encoding;
use crate::error::StreamError;
use std::io::{self, ErrorKind, Read, Write};
use std::str;

const CHUNK_SIZE: usize = 4096;

// Longest incomplete UTF-8 sequence carried over between reads.
const MAX_UTF8_CARRY: usize = 3;

fn read_some<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

impl Encoding {
    /// Encodes everything `reader` yields and writes the symbols to `writer`
    /// as UTF-8. Returns the number of symbols written.
    ///
    /// Neither `reader` nor `writer` are closed, `writer` is flushed.
    pub fn encode_stream<R, W>(&self, reader: &mut R, writer: &mut W) -> io::Result<usize>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut encoder = self.encoder();
        let mut buf = vec![0_u8; CHUNK_SIZE];
        let mut text = String::new();
        let mut written = 0;

        loop {
            let n = read_some(reader, &mut buf)?;
            if n == 0 {
                break;
            }

            encoder.update(&buf[..n], &mut text);
            written += text.chars().count();
            writer.write_all(text.as_bytes())?;
            text.clear();
        }

        encoder.finish(&mut text);
        written += text.chars().count();
        writer.write_all(text.as_bytes())?;
        writer.flush()?;

        Ok(written)
    }

    /// Decodes the UTF-8 symbols `reader` yields and writes the bytes to
    /// `writer`. Returns the number of bytes written.
    ///
    /// On error, bytes of the groups before the faulty one may already have
    /// been written.
    pub fn decode_stream<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<usize, StreamError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut decoder = self.decoder();
        let mut buf = vec![0_u8; CHUNK_SIZE + MAX_UTF8_CARRY];
        let mut carried = 0;
        let mut offset = 0;
        let mut output = Vec::new();
        let mut written = 0;

        loop {
            let n = read_some(reader, &mut buf[carried..])?;
            if n == 0 {
                if carried > 0 {
                    return Err(StreamError::InvalidUtf8 { offset });
                }
                break;
            }
            let filled = carried + n;

            let valid = match str::from_utf8(&buf[..filled]) {
                Ok(_) => filled,
                // Sequence cut by the end of the buffer.
                Err(err) if err.error_len().is_none() => err.valid_up_to(),
                Err(err) => {
                    return Err(StreamError::InvalidUtf8 {
                        offset: offset + err.valid_up_to(),
                    })
                }
            };
            let text = str::from_utf8(&buf[..valid]).map_err(|err| StreamError::InvalidUtf8 {
                offset: offset + err.valid_up_to(),
            })?;

            decoder.update(text, &mut output)?;
            writer.write_all(&output)?;
            written += output.len();
            output.clear();

            buf.copy_within(valid..filled, 0);
            carried = filled - valid;
            offset += valid;
        }

        decoder.finish(&mut output)?;
        writer.write_all(&output)?;
        written += output.len();
        writer.flush()?;

        Ok(written)
    }
}
