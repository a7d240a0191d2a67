//! Text framing spoken on the lake.

pub mod frame;
pub mod reply;
