use miette::Diagnostic;
use ring::signature::UnparsedPublicKey;
use thiserror::Error;

/// Verification error
#[derive(Debug, Diagnostic, Error)]
pub enum VerifyError {
    /// Verification failed
    #[error("Verification failed")]
    Verification,
}

/// Verify that the message corresponds with the signature using the provided verifying key
#[inline]
pub fn verify<B>(msg: &[u8], signature: &[u8], key: &UnparsedPublicKey<B>) -> Result<(), VerifyError>
where
    B: AsRef<[u8]>,
{
    key.verify(msg, signature)
        .map_err(|_| VerifyError::Verification)
}
