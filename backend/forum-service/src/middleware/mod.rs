/// HTTP middleware utilities for forum-service
///
/// `SessionMiddleware` resolves the session token (cookie or Bearer header)
/// once per request and stores the signed-in user in request extensions.
/// Handlers then pick it up with the `CurrentUser` extractor.
pub mod permissions;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use permissions::Requester;

/// Signed-in user stored in request extensions by `SessionMiddleware`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn requester(&self) -> Requester {
        Requester::from(&self.0)
    }
}

/// Cookie wins over the `Authorization: Bearer` header
pub fn pick_token(cookie: Option<&str>, authorization: Option<&str>) -> Option<String> {
    cookie
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            authorization
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
        .map(str::to_string)
}

/// Raw session token carried by a request, if any
pub fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    let cookie = req.cookie(cookie_name);
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());
    pick_token(cookie.as_ref().map(|c| c.value()), authorization)
}

/// Actix middleware that attaches the session's user, when there is one.
/// Requests without a valid session pass through anonymously.
pub struct SessionMiddleware {
    state: AppState,
}

impl SessionMiddleware {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    state: AppState,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let state = self.state.clone();

        Box::pin(async move {
            let token = session_token(req.request(), &state.config.session.cookie_name);

            if let Some(token) = token {
                match state.auth().resolve(&token).await {
                    Ok(Some((_, user))) => {
                        req.extensions_mut().insert(CurrentUser(user));
                    }
                    Ok(None) => {
                        tracing::debug!("unknown or expired session token");
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            service.call(req).await
        })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string())),
        )
    }
}
