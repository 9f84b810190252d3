pub mod address;
pub mod balance;

pub use address::*;
pub use balance::*;
