use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderValue,
    },
};

// ── Credentials extractor ──────────────────────────────────────────────────

/// The caller's session, carried through to the upstream API unchanged.
///
/// The dashboard never inspects or validates a session itself: whatever
/// `Cookie` and `Authorization` headers arrive are forwarded, and the
/// upstream decides. A missing session simply produces an upstream 401,
/// which handlers pass back to the caller.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    cookie: Option<HeaderValue>,
    authorization: Option<HeaderValue>,
}

impl Credentials {
    pub fn new(cookie: Option<HeaderValue>, authorization: Option<HeaderValue>) -> Self {
        Self {
            cookie,
            authorization,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.cookie.is_none() && self.authorization.is_none()
    }

    /// Attach the forwarded headers to an upstream request.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie.clone()),
            None => builder,
        };
        match &self.authorization {
            Some(auth) => builder.header(AUTHORIZATION, auth.clone()),
            None => builder,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let creds = Credentials::new(
            parts.headers.get(COOKIE).cloned(),
            parts.headers.get(AUTHORIZATION).cloned(),
        );
        if creds.is_anonymous() {
            tracing::debug!("request carries no session; forwarding anonymously");
        }
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn extracts_cookie_and_authorization() {
        let (mut parts, _) = Request::builder()
            .header(COOKIE, "token=abc")
            .header(AUTHORIZATION, "Bearer xyz")
            .body(())
            .unwrap()
            .into_parts();

        let creds = Credentials::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(creds.cookie.as_ref().unwrap(), "token=abc");
        assert_eq!(creds.authorization.as_ref().unwrap(), "Bearer xyz");
        assert!(!creds.is_anonymous());
    }

    #[tokio::test]
    async fn missing_headers_are_anonymous() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let creds = Credentials::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(creds.is_anonymous());
    }
}
