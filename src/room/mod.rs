//! Room lifecycle state machine (C4): create → open → ready_to_start →
//! in_game → closed, built over the C2 durable-store and C3 cache adapters.

mod model;
mod service;

pub use model::{LeaveReason, RoomView, SeatView};
pub use service::{CreatedRoom, RoomService};
