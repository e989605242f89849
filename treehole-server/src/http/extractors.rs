//! Custom Axum extractors

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::ApiError;
use crate::models::{MessageId, ValidationError};

/// Extract and validate a positive message id from the path
pub struct ValidMessageId(pub MessageId);

impl<S> FromRequestParts<S> for ValidMessageId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "message id",
                    reason: "must be a positive integer",
                })
            })?;

        let id = raw.parse::<MessageId>()?;
        Ok(Self(id))
    }
}

/// Best-effort caller address.
///
/// Proxy headers win over the socket peer, so deployments behind a reverse
/// proxy record the real client. Falls back to `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let ip = from_proxy_headers(&parts.headers)
            .or(peer)
            .unwrap_or_else(|| "unknown".to_owned());

        Ok(Self(ip))
    }
}

fn from_proxy_headers(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded.or_else(real_ip).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn client_ip(request: Request<()>) -> String {
        let (mut parts, _) = request.into_parts();
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        ip
    }

    #[tokio::test]
    async fn forwarded_for_first_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.2")
            .header("x-real-ip", "10.0.0.9")
            .body(())
            .unwrap();
        assert_eq!(client_ip(request).await, "203.0.113.7");
    }

    #[tokio::test]
    async fn real_ip_header() {
        let request = Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(())
            .unwrap();
        assert_eq!(client_ip(request).await, "198.51.100.4");
    }

    #[tokio::test]
    async fn socket_peer_fallback() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 54321))));
        assert_eq!(client_ip(request).await, "127.0.0.1");
    }

    #[tokio::test]
    async fn unknown_without_any_source() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(client_ip(request).await, "unknown");
    }
}
