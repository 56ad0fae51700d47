//! Request actor
//!
//! The intake desk has no login; callers may identify themselves with an
//! `X-Actor` header. The value is only recorded in tracing spans.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::fmt;

/// Header carrying the caller's name
pub const ACTOR_HEADER: &str = "x-actor";

/// Name used when the header is absent or unusable
pub const ANONYMOUS: &str = "anonymous";

const MAX_ACTOR_LEN: usize = 100;

/// Who made the request, as claimed by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentActor(String);

impl CurrentActor {
    /// Read the actor from request headers
    pub fn from_request_headers(req: &HttpRequest) -> Self {
        let name = req
            .headers()
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.chars().take(MAX_ACTOR_LEN).collect::<String>());

        Self(name.unwrap_or_else(|| ANONYMOUS.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrentActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequest for CurrentActor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_request_headers(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_actor_from_header() {
        let req = TestRequest::default()
            .insert_header((ACTOR_HEADER, "  front-desk-2 "))
            .to_http_request();
        let actor = CurrentActor::from_request_headers(&req);
        assert_eq!(actor.name(), "front-desk-2");
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(CurrentActor::from_request_headers(&req).name(), ANONYMOUS);

        let req = TestRequest::default()
            .insert_header((ACTOR_HEADER, "   "))
            .to_http_request();
        assert_eq!(CurrentActor::from_request_headers(&req).name(), ANONYMOUS);
    }

    #[test]
    fn test_long_names_are_truncated() {
        let req = TestRequest::default()
            .insert_header((ACTOR_HEADER, "a".repeat(500)))
            .to_http_request();
        assert_eq!(CurrentActor::from_request_headers(&req).name().len(), MAX_ACTOR_LEN);
    }
}
