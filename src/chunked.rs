//! decoder for HTTP's "chunked" Transfer-Encoding.
use std::io::{self, BufRead, Error, ErrorKind, Read};

const MAX_LINE_LENGTH: usize = 4096;
const CR_LF: [u8; 2] = [b'\r', b'\n'];

/// Reads the payload of a chunked body from `reader`, stripping the framing.
/// Trailer fields after the last chunk are consumed and dropped.
pub struct Reader<R> {
    reader: R,
    remaining: usize,
    check_end: bool,
    eof: bool,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Reader {
            reader,
            remaining: 0,
            check_end: false,
            eof: false,
        }
    }

    fn begin_chunk(&mut self) -> io::Result<()> {
        // chunk-size [; ext] CRLF
        let line = read_chunk_line(&mut self.reader)?;

        if line.is_empty() {
            return Err(error_malformed_chunked_encoding());
        }

        self.remaining = parse_hex_uint(&line).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

        if self.remaining == 0 {
            self.skip_trailer()?;
            self.eof = true;
        }

        Ok(())
    }

    fn skip_trailer(&mut self) -> io::Result<()> {
        loop {
            let mut line = Vec::new();
            if self.reader.read_until(b'\n', &mut line)? == 0 || trim_line(&line).is_empty() {
                return Ok(());
            }
        }
    }

    fn finish_chunk(&mut self) -> io::Result<()> {
        let mut footer = [0u8; 2];
        self.reader.read_exact(&mut footer)?;

        if footer != CR_LF {
            return Err(error_malformed_chunked_encoding());
        }

        self.check_end = false;
        Ok(())
    }
}

impl<R> Read for Reader<R>
where
    R: BufRead,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut consumed = 0usize;

        while !self.eof && consumed < buf.len() {
            if self.check_end {
                self.finish_chunk()?;
            }

            if self.remaining == 0 {
                // don't block on the next chunk header once we have data to hand out
                if consumed > 0 && !self.reader.fill_buf()?.contains(&b'\n') {
                    break;
                }

                self.begin_chunk()?;
                continue;
            }

            let end = buf.len().min(consumed + self.remaining);
            let n = self.reader.read(&mut buf[consumed..end])?;

            if n == 0 {
                return Err(Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed in the middle of a chunk",
                ));
            }

            consumed += n;
            self.remaining -= n;

            if self.remaining == 0 {
                self.check_end = true;
            }
        }

        Ok(consumed)
    }
}

fn error_line_too_long() -> Error {
    Error::new(ErrorKind::InvalidData, "chunk header line too long")
}

fn error_malformed_chunked_encoding() -> Error {
    Error::new(ErrorKind::InvalidData, "malformed chunked encoding")
}

fn parse_hex_uint(data: &[u8]) -> Result<usize, &'static str> {
    let mut n = 0usize;

    for (i, v) in data.iter().enumerate() {
        if i == 16 {
            return Err("http chunk length too large");
        }

        let digit = match *v {
            b'0'..=b'9' => v - b'0',
            b'a'..=b'f' => v - b'a' + 10,
            b'A'..=b'F' => v - b'A' + 10,
            _ => return Err("invalid byte in chunk length"),
        };

        n = (n << 4) | digit as usize;
    }

    Ok(n)
}

fn read_chunk_line<R: BufRead>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(MAX_LINE_LENGTH as u64 + 1)
        .read_until(b'\n', &mut line)?;

    if line.len() > MAX_LINE_LENGTH {
        return Err(error_line_too_long());
    }

    if let Some(idx) = line.iter().position(|c| *c == b';') {
        line.truncate(idx);
    }

    Ok(trim_line(&line).to_vec())
}

fn trim_line(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|c| !c.is_ascii_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);

    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read() {
        let data: &[u8] = b"7\r\nhello, \r\n17\r\nworld! 0123456789abcdef\r\n0\r\n\r\n";
        let mut reader = Reader::new(data);
        let mut writer = vec![];
        io::copy(&mut reader, &mut writer).expect("failed to dechunk");

        assert_eq!(b"hello, world! 0123456789abcdef", &writer[..]);
    }

    #[test]
    fn read_multiple() {
        let data: &[u8] = b"3\r\nfoo\r\n3\r\nbar\r\n0\r\n\r\n";
        let mut reader = Reader::new(data);
        let mut writer = vec![0u8; 10];
        let n = reader.read(&mut writer).expect("unexpected error");

        assert_eq!(6, n, "invalid buffer length: expect {}, got {}", 6, n);
        assert_eq!(b"foobar", &writer[..6]);
    }

    #[test]
    fn read_small_buffer() {
        let data: &[u8] = b"3\r\nfoo\r\n0\r\n\r\n";
        let mut reader = Reader::new(data);
        let mut writer = vec![0u8; 2];

        assert_eq!(reader.read(&mut writer).unwrap(), 2);
        assert_eq!(b"fo", &writer[..]);
        assert_eq!(reader.read(&mut writer).unwrap(), 1);
        assert_eq!(reader.read(&mut writer).unwrap(), 0);
    }

    #[test]
    fn read_ignore_extensions_and_trailer() {
        let data_str = String::from("7;ext=\"some quoted string\"\r\n")
            + "hello, \r\n"
            + "17;someext\r\n"
            + "world! 0123456789abcdef\r\n"
            + "0;someextension=sometoken\r\n"
            + "Expires: never\r\n\r\n";
        let mut reader = Reader::new(data_str.as_bytes());
        let mut writer = vec![];

        reader.read_to_end(&mut writer).expect("failed to dechunk");
        assert_eq!(b"hello, world! 0123456789abcdef", &writer[..]);
    }

    #[test]
    fn read_truncated() {
        let data: &[u8] = b"7\r\n1234";
        let mut reader = Reader::new(data);
        let mut writer = vec![];

        let err = io::copy(&mut reader, &mut writer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_bad_footer() {
        let data: &[u8] = b"3\r\nfooXX0\r\n\r\n";
        let mut reader = Reader::new(data);
        let mut writer = vec![];

        let err = reader.read_to_end(&mut writer).unwrap_err();
        assert_eq!(err.to_string(), "malformed chunked encoding");
    }

    #[test]
    fn read_bad_size() {
        let data: &[u8] = b"zz\r\nfoo\r\n";
        let mut reader = Reader::new(data);
        let mut writer = vec![];

        let err = reader.read_to_end(&mut writer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn hex_sizes() {
        assert_eq!(parse_hex_uint(b"1A"), Ok(26));
        assert_eq!(parse_hex_uint(b"ff"), Ok(255));
        assert!(parse_hex_uint(b"11111111111111111").is_err());
    }
}
