use super::SignatureHeader;
use http::{header::DATE, request::Parts};
use miette::Diagnostic;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Freshness check error
#[derive(Debug, Diagnostic, Error)]
pub enum SafetyCheckError {
    /// `Date` header couldn't be parsed
    #[error(transparent)]
    InvalidDateHeader(#[from] httpdate::Error),

    /// `Date` header had an invalid value (non-UTF8 value)
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::ToStrError),

    /// `Date` header is covered but missing
    #[error("Missing `Date` header")]
    MissingDateHeader,

    /// `(created)`/`(expires)` can't be represented as a point in time
    #[error("Invalid signature timestamp")]
    InvalidTimestamp,

    /// Signature expired
    #[error("Signature expired")]
    SignatureExpired,

    /// Signature was created in the future
    #[error("Signature created in the future")]
    SignatureFromFuture,

    /// Signature is older than the accepted clock skew
    #[error("Signature too old")]
    SignatureTooOld,
}

#[inline]
fn from_unix_timestamp(timestamp: u64) -> Result<SystemTime, SafetyCheckError> {
    SystemTime::UNIX_EPOCH
        .checked_add(Duration::from_secs(timestamp))
        .ok_or(SafetyCheckError::InvalidTimestamp)
}

/// Check whether `at` lies within `max_skew` of `now`, in either direction
#[inline]
fn check_skew(at: SystemTime, now: SystemTime, max_skew: Duration) -> Result<(), SafetyCheckError> {
    match now.duration_since(at) {
        Ok(age) if age > max_skew => Err(SafetyCheckError::SignatureTooOld),
        Ok(..) => Ok(()),
        Err(err) if err.duration() > max_skew => Err(SafetyCheckError::SignatureFromFuture),
        Err(..) => Ok(()),
    }
}

/// Check that the signature is neither expired nor outside of the accepted clock skew
///
/// - If `date` is covered, the `Date` header has to be within `max_skew` of `now`
/// - If `(created)` is present, it has to be within `max_skew` of `now`
/// - If `(expires)` is present, it must not lie in the past
pub fn is_fresh(
    parts: &Parts,
    signature_header: &SignatureHeader,
    max_skew: Duration,
    now: SystemTime,
) -> Result<(), SafetyCheckError> {
    if let Some(expires) = signature_header.expires {
        if from_unix_timestamp(expires)? < now {
            return Err(SafetyCheckError::SignatureExpired);
        }
    }

    if let Some(created) = signature_header.created {
        check_skew(from_unix_timestamp(created)?, now, max_skew)?;
    }

    if signature_header.covers(DATE.as_str()) {
        let date_header = parts
            .headers
            .get(DATE)
            .ok_or(SafetyCheckError::MissingDateHeader)?;

        let date = httpdate::parse_http_date(date_header.to_str()?)?;
        check_skew(date, now, max_skew)?;
    }

    Ok(())
}
