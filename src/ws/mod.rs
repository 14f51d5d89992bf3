//! WebSocket endpoint (C9): the read loop gluing the connection manager,
//! room service, and handler dispatch table together per connection.

mod upgrade;

pub use upgrade::handler;
