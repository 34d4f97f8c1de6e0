use super::SignatureHeader;
use std::fmt::Write;

/// Serialise a signature header into its cavage string representation
#[inline]
#[must_use]
pub fn serialise(header: &SignatureHeader) -> String {
    let mut buffer = String::new();

    let _ = write!(buffer, "keyId=\"{}\"", header.key_id);

    if let Some(ref algorithm) = header.algorithm {
        let _ = write!(buffer, ",algorithm=\"{algorithm}\"");
    }

    if let Some(created) = header.created {
        let _ = write!(buffer, ",created={created}");
    }

    if let Some(expires) = header.expires {
        let _ = write!(buffer, ",expires={expires}");
    }

    buffer.push_str(",headers=\"");
    buffer.push_str(&header.headers.join(" "));
    buffer.push('"');

    let _ = write!(
        buffer,
        ",signature=\"{}\"",
        base64_simd::STANDARD.encode_to_string(&header.signature)
    );

    buffer
}

#[cfg(test)]
mod test {
    use crate::cavage::SignatureHeader;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialise_parse() {
        let header = SignatureHeader {
            key_id: "https://example.com/keys/1".into(),
            algorithm: Some("hs2019".into()),
            headers: vec!["(request-target)".into(), "host".into(), "date".into()],
            signature: b"qdx".to_vec(),
            created: Some(1_402_170_695),
            expires: None,
        };

        let serialised = super::serialise(&header);
        assert_eq!(
            serialised,
            r#"keyId="https://example.com/keys/1",algorithm="hs2019",created=1402170695,headers="(request-target) host date",signature="cWR4""#
        );
        assert_eq!(crate::cavage::parse(&serialised).unwrap(), header);
    }
}
