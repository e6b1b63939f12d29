use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

pub struct RespReader<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin> RespReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read a Redis command (array of bulk strings)
    pub async fn read_command(&mut self) -> io::Result<Option<Vec<Vec<u8>>>> {
        let line = match self.read_line().await? {
            Some(line) => line,
            None => return Ok(None), // EOF
        };

        if !line.starts_with('*') {
            return Err(invalid("expected array"));
        }

        let count = parse_len(&line[1..], "invalid array length")?.unwrap_or(0);

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            let header = self.read_line().await?.ok_or_else(unexpected_eof)?;
            if !header.starts_with('$') {
                return Err(invalid("expected bulk string"));
            }
            let arg = self.read_bulk_body(&header[1..]).await?;
            args.push(arg.unwrap_or_default());
        }

        Ok(Some(args))
    }

    async fn read_bulk_body(&mut self, len: &str) -> io::Result<Option<Vec<u8>>> {
        let len = match parse_len(len, "invalid bulk string length")? {
            Some(len) => len,
            None => return Ok(None), // Null bulk string
        };

        let mut data = vec![0u8; len + 2]; // +2 for \r\n
        self.reader.read_exact(&mut data).await?;

        if &data[len..] != b"\r\n" {
            return Err(invalid("bulk string not terminated by CRLF"));
        }
        data.truncate(len);
        Ok(Some(data))
    }

    /// Next CRLF-terminated line without its terminator, `None` on clean EOF.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        if !line.ends_with("\r\n") {
            return Err(unexpected_eof());
        }
        line.truncate(line.len() - 2);
        if line.is_empty() {
            return Err(invalid("empty line"));
        }
        Ok(Some(line))
    }
}

/// Parse a RESP length; `-1` means null.
fn parse_len(s: &str, what: &'static str) -> io::Result<Option<usize>> {
    match s.trim().parse::<i64>() {
        Ok(-1) => Ok(None),
        Ok(n) if n >= 0 => Ok(Some(n as usize)),
        _ => Err(invalid(what)),
    }
}

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn unexpected_eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed mid-reply")
}
