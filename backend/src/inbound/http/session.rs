//! Cookie-session access for handlers.
//!
//! Wraps the Actix session so handlers deal only in [`SessionIdentity`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionIdentity};

pub(crate) const IDENTITY_KEY: &str = "identity";

/// Handler-facing session wrapper.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the caller identity.
    ///
    /// # Errors
    /// Internal error when the session cannot be serialised.
    pub fn persist_identity(&self, identity: &SessionIdentity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(IDENTITY_KEY, identity)
            .map_err(|err| Error::internal(format!("failed to persist session: {err}")))
    }

    /// Stored identity, if any. An unreadable entry is treated as absent.
    #[must_use]
    pub fn identity(&self) -> Option<SessionIdentity> {
        match self.0.get::<SessionIdentity>(IDENTITY_KEY) {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "discarding unreadable session identity");
                self.0.remove(IDENTITY_KEY);
                None
            }
        }
    }

    /// Drop the session entirely.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
