//! jm-wire: the JSON-RPC 2.0 request/response shapes and `Content-Length`
//! message framing shared by `jermd` and `jerminal` (C11).

pub mod framing;
pub mod rpc;

pub use framing::{frame, read_message, write_message, FramingError, MAX_MESSAGE_SIZE};
pub use rpc::*;
