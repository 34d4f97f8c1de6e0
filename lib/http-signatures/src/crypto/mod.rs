//!
//! Common cryptographic operations
//!

mod sign;
mod verify;

pub mod parse;

pub use self::sign::{sign, SigningKey};
pub use self::verify::{verify, VerifyError};
