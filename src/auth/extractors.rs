use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::token::Claims;
use crate::error::AppError;
use crate::models::Identity;

/// The verified access-token claims attached to a request by `AuthMiddleware`.
///
/// A dedicated type, so nothing else stored in the extensions can be mistaken
/// for an authentication result.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Extracts the authenticated caller from request extensions.
///
/// Fails closed with 401 when the middleware did not run or did not attach a
/// verified token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn from_request_token(req: &HttpRequest) -> Result<Self, AppError> {
        req.extensions()
            .get::<Authenticated>()
            .map(|Authenticated(claims)| AuthenticatedUser(claims.identity()))
            .ok_or_else(|| AppError::Unauthorized("Missing authentication".to_string()))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_token(req).map_err(Into::into))
    }
}
