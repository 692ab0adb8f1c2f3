//! Login and session ownership.
//!
//! `SessionDriver` owns the remote actor for the whole run. A successful
//! `authenticate()` hands out a `Session` that mutably borrows the driver, so
//! only one session can be live at a time and none can outlive `close()`.
//!
//! State machine:
//!
//!   Unauthenticated → Authenticating → { Authenticated, AuthFailed } → Closed

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use rxbatch_contracts::{
    error::{RxError, RxResult},
    records::Credentials,
};

use crate::traits::{LoginDetector, RemoteActor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    AuthFailed,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::AuthFailed => "auth-failed",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Treats a location as the login surface when it contains `marker` or is
/// exactly the login URL.
#[derive(Debug, Clone)]
pub struct LocationHeuristic {
    login_url: String,
    marker: String,
}

impl LocationHeuristic {
    pub fn new(login_url: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            marker: marker.into(),
        }
    }
}

impl LoginDetector for LocationHeuristic {
    fn is_login_surface(&self, location: &str) -> bool {
        let marker_hit = !self.marker.is_empty() && location.contains(&self.marker);
        marker_hit || location == self.login_url
    }
}

/// Owns the remote actor and its login state.
pub struct SessionDriver<A: RemoteActor> {
    actor: A,
    detector: Box<dyn LoginDetector>,
    state: SessionState,
    wait_timeout: Option<Duration>,
}

/// An authenticated session. Borrowing the driver is what makes it exclusive.
pub struct Session<'d, A: RemoteActor> {
    actor: &'d mut A,
}

impl<A: RemoteActor> Session<'_, A> {
    pub fn actor(&mut self) -> &mut A {
        self.actor
    }
}

impl<A: RemoteActor> SessionDriver<A> {
    pub fn new(actor: A, detector: Box<dyn LoginDetector>) -> Self {
        Self {
            actor,
            detector,
            state: SessionState::Unauthenticated,
            wait_timeout: None,
        }
    }

    /// Bound the whole login interaction. `None` waits indefinitely.
    pub fn with_wait_timeout(mut self, limit: Option<Duration>) -> Self {
        self.wait_timeout = limit;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Log in and return the session.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` when the post-submit location is still the
    ///   login surface
    /// - whatever the actor raised while logging in
    /// - `RemoteInteraction` when called outside `Unauthenticated`
    pub async fn authenticate(&mut self, credentials: &Credentials) -> RxResult<Session<'_, A>> {
        if self.state != SessionState::Unauthenticated {
            return Err(RxError::remote(format!(
                "cannot authenticate a session that is {}",
                self.state
            )));
        }

        self.state = SessionState::Authenticating;
        info!(username = %credentials.username, "logging in");

        let login = match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, self.login(credentials))
                .await
                .unwrap_or_else(|_| {
                    Err(RxError::remote(format!(
                        "login did not complete within {} ms",
                        limit.as_millis()
                    )))
                }),
            None => self.login(credentials).await,
        };
        let location = match login {
            Ok(location) => location,
            Err(e) => {
                self.state = SessionState::AuthFailed;
                warn!(error = %e, "login interaction failed");
                return Err(e);
            }
        };

        if self.detector.is_login_surface(&location) {
            self.state = SessionState::AuthFailed;
            warn!(location = %location, "still on login surface after submitting credentials");
            return Err(RxError::AuthenticationFailed { location });
        }

        self.state = SessionState::Authenticated;
        info!(location = %location, "login accepted");
        Ok(Session {
            actor: &mut self.actor,
        })
    }

    async fn login(&mut self, credentials: &Credentials) -> RxResult<String> {
        self.actor.open_login().await?;
        self.actor.submit_credentials(credentials).await?;
        let location = self.actor.current_location().await?;
        debug!(location = %location, "post-login location");
        Ok(location)
    }

    /// Release the remote actor. Calling it again is a no-op.
    pub async fn close(&mut self) -> RxResult<()> {
        if self.state == SessionState::Closed {
            debug!("session already closed");
            return Ok(());
        }
        self.state = SessionState::Closed;
        info!("closing remote session");
        self.actor.close().await
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
