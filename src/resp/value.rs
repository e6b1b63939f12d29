use bytes::{BufMut, BytesMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    BulkString(Option<Vec<u8>>),
}

impl RespValue {
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn null() -> Self {
        RespValue::BulkString(None)
    }

    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(format!("ERR {}", msg.into()))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(bytes.into()))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf.to_vec()
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => put_line(buf, b'+', s.as_bytes()),
            RespValue::Error(s) => put_line(buf, b'-', s.as_bytes()),
            RespValue::BulkString(None) => buf.put_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                put_line(buf, b'$', data.len().to_string().as_bytes());
                buf.put_slice(data);
                buf.put_slice(b"\r\n");
            }
        }
    }
}

fn put_line(buf: &mut BytesMut, prefix: u8, body: &[u8]) {
    buf.reserve(body.len() + 3);
    buf.put_u8(prefix);
    buf.put_slice(body);
    buf.put_slice(b"\r\n");
}
