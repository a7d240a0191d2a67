pub mod bus;
pub mod endpoint;
