pub mod csv;
pub mod wire;
