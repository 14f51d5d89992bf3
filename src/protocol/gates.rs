//! Pre-dispatch gates (C6 §4.6): every inbound frame passes these before a
//! handler ever sees it.

use crate::error::ProtocolError;

use super::envelope::ClientMessage;

pub const MAX_FRAME_BYTES: usize = 65_536;

pub fn check_size(bytes: &[u8]) -> Result<(), ProtocolError> {
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::MessageTooLarge);
    }
    Ok(())
}

pub fn parse_envelope(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(|_| ProtocolError::InvalidJson)
}
