use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, error};

use super::extractors::Authenticated;
use super::token::{TokenKind, TokenService};
use crate::error::AppError;

/// Verifies the `Authorization: Bearer` access token once per request and
/// attaches the resulting [`Authenticated`] value to the request extensions.
///
/// Wrap only the scopes that need authentication. The `TokenService` is read
/// from app data, so it must be registered with `App::app_data`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(tokens) = req.app_data::<web::Data<TokenService>>().cloned() else {
            error!("AuthMiddleware is active but no TokenService is registered");
            let app_err = AppError::InternalServerError("token service missing".into());
            return reject(req, app_err);
        };

        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = bearer else {
            return reject(req, AppError::Unauthorized("Missing token".into()));
        };

        match tokens.verify_token(token, TokenKind::Access) {
            Ok(claims) => {
                req.extensions_mut().insert(Authenticated(claims));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(token_err) => {
                debug!("rejected access token on {}: {}", req.path(), token_err);
                reject(req, token_err.into())
            }
        }
    }
}

/// Short-circuits the request with the JSON error response for `err`.
fn reject<B: 'static>(
    req: ServiceRequest,
    err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.into_response(err.error_response()).map_into_right_body();
    Box::pin(async move { Ok(response) })
}
