#[macro_use]
extern crate tracing;

use std::fmt::{self, Debug, Display};

pub use self::ext::ResultExt;

mod ext;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[macro_export]
macro_rules! bail {
    ($($tt:tt)+) => {
        return Err($crate::hanko_error!($($tt)+))
    };
}

#[macro_export]
macro_rules! hanko_error {
    (kind = $kind:expr, $($arg:tt)+) => {
        $crate::Error::msg(format!($($arg)+)).with_kind($kind)
    };
    ($($arg:tt)+) => {
        $crate::hanko_error!(kind = $crate::ErrorKind::Other, $($arg)+)
    };
}

/// Error classes surfaced by the authentication pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent key document
    Data,

    /// Misconfiguration, algorithm/key type mismatch or revoked key
    InvalidState,

    /// Signature doesn't verify
    NotAllowed,

    /// Document couldn't be retrieved
    NotFound,

    /// Unrecognised scheme, unsupported header or missing optional hook
    NotSupported,

    /// Malformed or unsigned header, undecodable value
    Syntax,

    /// Value of an unexpected shape, such as an unparseable timestamp
    Type,

    Other,
}

impl ErrorKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Data => "DataError",
            Self::InvalidState => "InvalidStateError",
            Self::NotAllowed => "NotAllowedError",
            Self::NotFound => "NotFoundError",
            Self::NotSupported => "NotSupportedError",
            Self::Syntax => "SyntaxError",
            Self::Type => "TypeError",
            Self::Other => "Error",
        }
    }
}

impl Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Error {
    kind: ErrorKind,
    inner: eyre::Report,
}

impl Error {
    #[inline]
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<eyre::Report>,
    {
        Self {
            kind,
            inner: err.into(),
        }
    }

    #[inline]
    pub fn msg<M>(msg: M) -> Self
    where
        M: Debug + Display + Send + Sync + 'static,
    {
        eyre::Report::msg(msg).into()
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn error(&self) -> &eyre::Report {
        &self.inner
    }

    #[must_use]
    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }

    /// Wrap the error with a message and reclassify it
    #[must_use]
    pub fn wrap<D>(self, kind: ErrorKind, msg: D) -> Self
    where
        D: Display + Send + Sync + 'static,
    {
        trace!(from = %self.kind, to = %kind, "reclassifying error");

        Self {
            kind,
            inner: self.inner.wrap_err(msg),
        }
    }
}

impl<T> From<T> for Error
where
    T: Into<eyre::Report>,
{
    fn from(value: T) -> Self {
        Self {
            kind: ErrorKind::Other,
            inner: value.into(),
        }
    }
}

impl From<Error> for BoxError {
    fn from(value: Error) -> Self {
        BoxError::from(value.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("inner", &self.inner)
            .finish()
    }
}

impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.kind, self.inner)
    }
}

#[cfg(test)]
mod test {
    use crate::{Error, ErrorKind, Result, ResultExt};
    use thiserror::Error as ThisError;

    #[derive(Debug, ThisError)]
    #[error("resolver exploded")]
    struct ResolverError;

    fn fails() -> Result<()> {
        bail!(kind = ErrorKind::NotSupported, "unsupported scheme `{}`", "ftp");
    }

    #[test]
    fn macro_sets_kind() {
        let err = fails().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert_eq!(err.to_string(), "NotSupportedError: unsupported scheme `ftp`");
    }

    #[test]
    fn foreign_errors_default_to_other() {
        let err: Error = ResolverError.into();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn result_ext_reclassifies() {
        let result: Result<(), ResolverError> = Err(ResolverError);
        let err = result.with_error_kind(ErrorKind::NotFound).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("resolver exploded"));
    }

    #[test]
    fn wrap_keeps_cause() {
        let err = Error::new(ErrorKind::Syntax, ResolverError)
            .wrap(ErrorKind::Data, "key check failed");

        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(
            err.to_string(),
            "DataError: key check failed: resolver exploded"
        );
    }
}
