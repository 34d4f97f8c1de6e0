#[macro_use]
extern crate tracing;

pub use self::{
    document::{KeyDocument, PublicKeyMaterial},
    resolver::{KeyResolver, KeyResolverRegistry},
    validate::{validate, ControllerKeyCheck, KeyCheck, ValidationOptions},
};

pub mod document;
pub mod resolver;
pub mod validate;

/// Proof purpose a key has to be listed under to invoke capabilities
pub const CAPABILITY_INVOCATION: &str = "capabilityInvocation";

pub mod key_type {
    pub const CRYPTOGRAPHIC_KEY: &str = "CryptographicKey";
    pub const ED25519_2018: &str = "Ed25519VerificationKey2018";
    pub const RSA_2018: &str = "RsaVerificationKey2018";
}
