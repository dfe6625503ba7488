// src/middleware/client_info.rs

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::{convert::Infallible, net::SocketAddr};

use crate::models::theme::ClientInfo;

const MAX_USER_AGENT_LEN: usize = 512;

// Best-effort client address and user agent; never rejects
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = forwarded_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect());

        Ok(ClientInfo { ip_address, user_agent })
    }
}

// First hop of X-Forwarded-For, then X-Real-IP
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header_value = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    header_value("x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .or_else(|| header_value("x-real-ip"))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientInfo {
        let (mut parts, _) = request.into_parts();
        let Ok(info) = ClientInfo::from_request_parts(&mut parts, &()).await;
        info
    }

    #[tokio::test]
    async fn forwarded_for_wins_over_socket_address() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header(header::USER_AGENT, "NightMate/1.0")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 5000))));

        let info = extract(request).await;
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("NightMate/1.0"));
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 40000))));

        let info = extract(request).await;
        assert_eq!(info.ip_address.as_deref(), Some("192.168.1.20"));
        assert_eq!(info.user_agent, None);
    }

    #[tokio::test]
    async fn nothing_known_is_fine() {
        let info = extract(Request::builder().body(()).unwrap()).await;
        assert_eq!(info.ip_address, None);
    }
}
