use super::KeyResolver;
use async_trait::async_trait;
use bytes::Bytes;
use hanko_error::{bail, hanko_error, ErrorKind, Result, ResultExt};
use http::{
    header::{ACCEPT, USER_AGENT},
    Request, Response, StatusCode,
};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Empty, Limited};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use serde_json::Value;
use std::{error::Error as StdError, time::Duration};
use tower::{timeout::Timeout, BoxError, Service, ServiceExt};

const ACCEPT_VALUE: &str = "application/ld+json, application/activity+json, application/json";
const USER_AGENT_VALUE: &str = concat!("hanko/", env!("CARGO_PKG_VERSION"));

/// Default HTTP client stack
pub type DefaultClient = Timeout<HyperClient<HttpsConnector<HttpConnector>, Empty<Bytes>>>;

/// Fetches key documents over HTTPS
///
/// Key ids with a fragment (`https://example.com/users/1#main-key`) are looked up
/// inside the fetched document under `publicKey`.
#[derive(Clone)]
pub struct HttpsResolver<S = DefaultClient> {
    body_limit: usize,
    client: S,
}

impl HttpsResolver {
    pub fn from_config(config: &hanko_config::resolver::Configuration) -> Result<Self> {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .with_error_kind(ErrorKind::InvalidState)?
            .https_only()
            .enable_http1()
            .enable_http2()
            .build();

        let client = HyperClient::builder(TokioExecutor::new()).build(connector);
        let client = Timeout::new(client, Duration::from_secs(config.request_timeout_secs));

        Ok(Self::service(client, config.body_limit))
    }
}

impl<S> HttpsResolver<S> {
    /// Resolver on top of another HTTP client service
    #[must_use]
    pub fn service(client: S, body_limit: usize) -> Self {
        Self { body_limit, client }
    }
}

/// Pick the node the key id refers to
fn select_key(document: Value, key_id: &str) -> Result<Value> {
    if document.get("id").and_then(Value::as_str) == Some(key_id) {
        return Ok(document);
    }

    let embedded = match document.get("publicKey") {
        Some(key @ Value::Object(..)) => vec![key],
        Some(Value::Array(keys)) => keys.iter().collect(),
        _ => Vec::new(),
    };

    embedded
        .into_iter()
        .find(|key| key.get("id").and_then(Value::as_str) == Some(key_id))
        .cloned()
        .ok_or_else(|| {
            hanko_error!(
                kind = ErrorKind::NotFound,
                "fetched document doesn't describe `{key_id}`"
            )
        })
}

#[async_trait]
impl<S, B> KeyResolver for HttpsResolver<S>
where
    S: Service<Request<Empty<Bytes>>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: StdError + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn resolve(&self, id: &str) -> Result<Value> {
        let location = id.split_once('#').map_or(id, |(location, _fragment)| location);
        let request = Request::get(location)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Empty::new())
            .with_error_kind(ErrorKind::NotFound)?;

        let response = self
            .client
            .clone()
            .oneshot(request)
            .await
            .map_err(|err| {
                hanko_error!(
                    kind = ErrorKind::NotFound,
                    "request to `{location}` failed: {}",
                    Into::<BoxError>::into(err)
                )
            })?;

        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
            bail!(kind = ErrorKind::NotFound, "`{location}` doesn't exist");
        }
        if !status.is_success() {
            bail!(
                kind = ErrorKind::NotFound,
                "fetching `{location}` failed with status {status}"
            );
        }

        let body = Limited::new(response.into_body(), self.body_limit)
            .collect()
            .await
            .map_err(|err| {
                hanko_error!(
                    kind = ErrorKind::NotFound,
                    "reading `{location}` failed: {err}"
                )
            })?
            .to_bytes();

        let document: Value = serde_json::from_slice(&body).with_error_kind(ErrorKind::NotFound)?;
        debug!(%location, "fetched key document");

        select_key(document, id)
    }
}

#[cfg(test)]
mod test {
    use super::{select_key, HttpsResolver};
    use crate::resolver::KeyResolver;
    use bytes::Bytes;
    use hanko_error::ErrorKind;
    use http::{Request, Response, StatusCode};
    use http_body_util::{Empty, Full};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::convert::Infallible;
    use tower::service_fn;

    fn resolver_with(status: StatusCode, body: &'static str) -> impl KeyResolver {
        let client = service_fn(move |req: Request<Empty<Bytes>>| async move {
            assert_eq!(req.uri().fragment(), None);
            assert!(req.headers().contains_key("accept"));

            let response = Response::builder()
                .status(status)
                .body(Full::new(Bytes::from_static(body.as_bytes())))
                .unwrap();

            Ok::<_, Infallible>(response)
        });

        HttpsResolver::service(client, 1024)
    }

    #[tokio::test]
    async fn fetches_document() {
        let resolver = resolver_with(
            StatusCode::OK,
            r#"{"id":"https://example.com/keys/1","owner":"https://example.com/users/1"}"#,
        );

        let document = resolver.resolve("https://example.com/keys/1").await.unwrap();
        assert_eq!(document["owner"], "https://example.com/users/1");
    }

    #[tokio::test]
    async fn embedded_public_key() {
        let resolver = resolver_with(
            StatusCode::OK,
            r#"{"id":"https://example.com/users/1","publicKey":{"id":"https://example.com/users/1#main-key","publicKeyPem":"pem"}}"#,
        );

        let key = resolver
            .resolve("https://example.com/users/1#main-key")
            .await
            .unwrap();
        assert_eq!(key["publicKeyPem"], "pem");
    }

    #[tokio::test]
    async fn missing_document() {
        let resolver = resolver_with(StatusCode::GONE, "");
        let err = resolver
            .resolve("https://example.com/keys/1")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn body_limit() {
        let client = service_fn(|_req: Request<Empty<Bytes>>| async {
            Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(vec![b' '; 4096]))))
        });
        let resolver = HttpsResolver::service(client, 16);

        let err = resolver
            .resolve("https://example.com/keys/1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unrelated_document() {
        let document = json!({ "id": "https://example.com/users/2" });
        let err = select_key(document, "https://example.com/users/1#main-key").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
