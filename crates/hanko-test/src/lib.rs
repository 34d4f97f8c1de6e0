//!
//! Fixtures shared by the integration tests
//!

#![allow(clippy::missing_panics_doc)]

pub mod key;
pub mod request;

pub use self::{
    key::{Ed25519Key, RsaKey},
    request::{request, sign, DEFAULT_COMPONENTS},
};
