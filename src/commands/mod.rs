//! Commands run by the binary

pub mod notify;
pub mod sync;
