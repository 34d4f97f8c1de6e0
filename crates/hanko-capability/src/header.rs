use hanko_error::{bail, ErrorKind, Result};

/// Single parsed `Object-Capability` entry
///
/// `value` is already base64url-decoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityHeader {
    pub ty: String,
    pub value: Vec<u8>,
    pub action: Option<String>,
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value)
}

fn set<'a>(slot: &mut Option<&'a str>, name: &str, value: &'a str) -> Result<()> {
    if slot.is_some() {
        bail!(
            kind = ErrorKind::Syntax,
            "duplicate capability parameter `{name}`"
        );
    }

    *slot = Some(value);
    Ok(())
}

/// Decode base64url, tolerating trailing padding
pub fn decode_value(value: &str) -> Result<Vec<u8>> {
    let Ok(decoded) = base64_simd::URL_SAFE_NO_PAD.decode_to_vec(value.trim_end_matches('='))
    else {
        bail!(
            kind = ErrorKind::Syntax,
            "capability value isn't valid base64url"
        );
    };

    Ok(decoded)
}

/// Parse `type=<token>; value=<base64url>[; action=<token>]`
///
/// Parameters may appear in any order and may be wrapped in double quotes.
pub fn parse(input: &str) -> Result<CapabilityHeader> {
    let mut ty = None;
    let mut value = None;
    let mut action = None;

    for param in input.split(';').map(str::trim).filter(|param| !param.is_empty()) {
        let Some((name, param_value)) = param.split_once('=') else {
            bail!(
                kind = ErrorKind::Syntax,
                "malformed capability parameter `{param}`"
            );
        };
        let name = name.trim();
        let param_value = unquote(param_value.trim());

        match name {
            "type" => set(&mut ty, name, param_value)?,
            "value" => set(&mut value, name, param_value)?,
            "action" => set(&mut action, name, param_value)?,
            _ => bail!(
                kind = ErrorKind::Syntax,
                "unknown capability parameter `{name}`"
            ),
        }
    }

    let Some(ty) = ty.filter(|ty| !ty.is_empty()) else {
        bail!(kind = ErrorKind::Syntax, "capability is missing `type`");
    };
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        bail!(kind = ErrorKind::Syntax, "capability is missing `value`");
    };

    Ok(CapabilityHeader {
        ty: ty.to_string(),
        value: decode_value(value)?,
        action: action.map(ToString::to_string),
    })
}
