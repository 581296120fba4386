pub mod outcome;
pub mod transport;
