use hanko_config::verification::Configuration;
use hanko_error::{bail, Error, ErrorKind, Result};
use http::{header::AUTHORIZATION, request::Parts};
use http_signatures::{
    cavage::{self, signature_string, SignatureHeader},
    SIGNATURE_HEADER,
};
use std::time::{Duration, SystemTime};

const AUTHORIZATION_SCHEME: &str = "Signature ";

/// Credential of a request together with the string it signs
#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub signature: SignatureHeader,
    pub signing_string: String,
}

fn credential(parts: &Parts) -> Result<SignatureHeader> {
    if let Some(value) = parts.headers.get(&SIGNATURE_HEADER) {
        let value = value
            .to_str()
            .map_err(|err| Error::new(ErrorKind::Syntax, err))?;
        return cavage::parse(value).map_err(|err| Error::new(ErrorKind::Syntax, err));
    }

    let authorization = parts
        .headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| {
            value
                .get(..AUTHORIZATION_SCHEME.len())
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME))
        });

    let Some(authorization) = authorization else {
        bail!(
            kind = ErrorKind::NotAllowed,
            "request doesn't carry an HTTP signature"
        );
    };

    cavage::parse_authorization(authorization).map_err(|err| Error::new(ErrorKind::Syntax, err))
}

/// Extract the credential, enforce the covered headers and build the signing string
#[instrument(skip_all)]
pub fn extract(parts: &Parts, config: &Configuration, now: SystemTime) -> Result<SignedRequest> {
    let signature = credential(parts)?;

    if let Some(missing) = config
        .required_headers
        .iter()
        .find(|required| !signature.covers(required))
    {
        bail!(
            kind = ErrorKind::Syntax,
            "required header `{missing}` isn't covered by the signature"
        );
    }

    let signing_string = signature_string::construct(parts, &signature)
        .map_err(|err| Error::new(ErrorKind::Syntax, err))?;

    cavage::is_fresh(
        parts,
        &signature,
        Duration::from_secs(config.max_clock_skew_secs),
        now,
    )
    .map_err(|err| Error::new(ErrorKind::NotAllowed, err))?;

    Ok(SignedRequest {
        signature,
        signing_string,
    })
}
