//! Meeting route: resolve the call, gate on device setup, enter the room.

pub mod controller;
pub mod flow;

pub use controller::{DeviceSetup, JoinFlowController, JoinFlowHandle, RoomRenderer};
pub use flow::{JoinFlow, JoinFlowError, JoinPhase, JoinSnapshot, ResolveTicket};
