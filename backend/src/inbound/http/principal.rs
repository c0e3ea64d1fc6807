//! Request-scoped caller extractor.
//!
//! The session cookie only stores a user id. [`Caller`] resolves it through
//! [`crate::domain::ports::UserProfileQuery`] on every request so role and
//! hostel changes apply immediately and a deleted account is logged out.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Principal, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The authenticated user behind the current request.
#[derive(Debug, Clone)]
pub struct Caller {
    user: User,
}

impl Caller {
    /// Access control view of the caller.
    pub fn principal(&self) -> Principal {
        Principal::from(&self.user)
    }

    /// Full profile of the caller.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Consume the extractor, yielding the profile.
    pub fn into_user(self) -> User {
        self.user
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = session.await?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let user_id = session.require_user_id()?;
            let user = state.profile.fetch_profile(&user_id).await?;
            Ok(Self { user })
        })
    }
}
