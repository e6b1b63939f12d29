//! Server side of RESP: command decoding and reply encoding, enough to
//! stand in for an instance in tests.

mod reader;
mod value;

pub use reader::RespReader;
pub use value::RespValue;
