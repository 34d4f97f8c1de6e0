use super::SignatureHeader;
use logos::{Lexer, Logos, Span};
use miette::{Diagnostic, SourceSpan};
use std::num::ParseIntError;
use thiserror::Error;

/// Cavage header parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum ParseError {
    /// Base64 decoding of the signature failed
    #[error(transparent)]
    Base64(#[from] base64_simd::Error),

    /// A parameter was specified more than once
    #[error("Duplicate parameter `{0}`")]
    DuplicateParameter(String),

    /// `created` or `expires` isn't a valid integer
    #[error(transparent)]
    InvalidTimestamp(#[from] ParseIntError),

    /// Mandatory parameter is missing
    #[error("Missing `{0}` parameter")]
    MissingParameter(&'static str),

    /// Input ended in the middle of a parameter
    #[error("Unexpected end of input")]
    UnexpectedEnd,

    /// Token that doesn't fit the grammar
    #[error("Unexpected token")]
    #[diagnostic(code(http_signatures::cavage::unexpected_token))]
    UnexpectedToken {
        /// Location of the offending token
        #[label("unexpected token")]
        span: SourceSpan,
    },

    /// `Authorization` header doesn't use the `Signature` scheme
    #[error("Unsupported authorization scheme")]
    UnsupportedScheme,
}

#[derive(Debug, Logos)]
#[logos(skip r"[ \t]+")]
enum TokenTy {
    #[regex(r"[A-Za-z0-9_.\-]+")]
    Bare,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    Quoted,

    #[token(",")]
    Comma,
}

#[derive(Debug)]
struct Token {
    pub ty: TokenTy,
    pub span: Span,
}

impl Token {
    pub fn parse(input: &str) -> impl Iterator<Item = Result<Token, Span>> + '_ {
        Lexer::<'_, TokenTy>::new(input)
            .spanned()
            .map(|(ty, span)| match ty {
                Ok(ty) => Ok(Token { ty, span }),
                Err(()) => Err(span),
            })
    }
}

macro_rules! ensure {
    ($self:expr, $value:expr, $pattern:pat) => {{
        let Some(value) = $value else {
            $self.is_broken = true;
            return Some(Err(ParseError::UnexpectedEnd));
        };

        let value = match value {
            Ok(value) if matches!(value.ty, $pattern) => value,
            Ok(Token { span, .. }) | Err(span) => {
                $self.is_broken = true;
                return Some(Err(ParseError::UnexpectedToken { span: span.into() }));
            }
        };

        value
    }};
}

struct ParseIter<'a, I> {
    /// Stream of tokens wrapped into a result
    inner: I,

    /// Reference to the original input that was fed to the lexer
    input: &'a str,

    /// Marker whether we encountered any error or illegal token
    ///
    /// If we did, the iterator will stop yielding any results
    is_broken: bool,
}

impl<'a, I> Iterator for ParseIter<'a, I>
where
    I: Iterator<Item = Result<Token, Span>>,
{
    type Item = Result<(&'a str, &'a str), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_broken {
            return None;
        }

        let key = ensure!(self, Some(self.inner.next()?), TokenTy::Bare);
        ensure!(self, self.inner.next(), TokenTy::Equals);
        let value = ensure!(self, self.inner.next(), TokenTy::Quoted | TokenTy::Bare);

        if let Some(next) = self.inner.next() {
            ensure!(self, Some(next), TokenTy::Comma);
        }

        let key = &self.input[key.span];
        let value = &self.input[value.span];
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .unwrap_or(value);

        Some(Ok((key, value)))
    }
}

/// Parse a cavage `Signature` header
///
/// Unknown parameters are ignored. If the `headers` parameter is absent, the covered components default to `(created)`.
#[inline]
pub fn parse(input: &str) -> Result<SignatureHeader, ParseError> {
    let kv_iter = ParseIter {
        inner: Token::parse(input),
        input,
        is_broken: false,
    };

    let mut key_id = None;
    let mut algorithm = None;
    let mut headers = None;
    let mut signature = None;
    let mut created = None;
    let mut expires = None;

    for kv in kv_iter {
        let (key, value) = kv?;

        let slot = match key {
            "keyId" => &mut key_id,
            "algorithm" => &mut algorithm,
            "headers" => &mut headers,
            "signature" => &mut signature,
            "created" => &mut created,
            "expires" => &mut expires,
            _ => continue,
        };

        if slot.replace(value).is_some() {
            return Err(ParseError::DuplicateParameter(key.to_string()));
        }
    }

    let headers = headers.map_or_else(
        || vec![super::CREATED.to_string()],
        |headers| {
            headers
                .split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect()
        },
    );

    let signature = signature.ok_or(ParseError::MissingParameter("signature"))?;

    Ok(SignatureHeader {
        key_id: key_id
            .ok_or(ParseError::MissingParameter("keyId"))?
            .to_string(),
        algorithm: algorithm.map(str::to_ascii_lowercase),
        headers,
        signature: base64_simd::STANDARD.decode_to_vec(signature)?,
        created: created.map(str::parse).transpose()?,
        expires: expires.map(str::parse).transpose()?,
    })
}

/// Parse the value of an `Authorization` header using the `Signature` scheme
#[inline]
pub fn parse_authorization(input: &str) -> Result<SignatureHeader, ParseError> {
    let (scheme, params) = input
        .trim_start()
        .split_once(' ')
        .ok_or(ParseError::UnsupportedScheme)?;

    if !scheme.eq_ignore_ascii_case("signature") {
        return Err(ParseError::UnsupportedScheme);
    }

    parse(params)
}
