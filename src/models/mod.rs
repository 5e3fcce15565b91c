pub mod account;
pub mod message;

pub use account::*;
pub use message::*;
