use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, error::ErrorUnauthorized, web};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::RequestId;

/// User resolved by [`JwtAuthMiddleware`](crate::presentation::middleware::JwtAuthMiddleware).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("missing authenticated user"))),
        }
    }
}

/// Viewer id on public routes. Anonymous when the bearer token is missing or
/// does not verify.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<Uuid>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let viewer = req.app_data::<web::Data<JwtKeys>>().and_then(|keys| {
            bearer_token(req)
                .and_then(|token| keys.verify_token(token).ok())
                .and_then(|claims| claims.user_id())
        });
        ready(Ok(OptionalUser(viewer)))
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
