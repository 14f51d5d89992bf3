//! Message protocol (C6): versioned envelope, tagged payload shapes, and the
//! size/rate gates every inbound frame passes through before dispatch.

mod envelope;
mod gates;
mod rate_limit;

pub use envelope::{ClientMessage, ErrorPayload, MessageType, ServerMessage};
pub use gates::{check_size, parse_envelope, MAX_FRAME_BYTES};
pub use rate_limit::RateLimiter;
