//! Navigation Guard
//!
//! Decides which page is reachable for the current session state.
//!
//! - Protected pages resolve to `Login` without a token
//! - `Login` and `Register` resolve to `Dashboard` with a token
//! - `/` is the login entry point, unknown paths fall through to the dashboard

use std::sync::RwLock;

use crate::model::AccountId;
use crate::session::Session;

/// A page of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Accounts,
    AccountDetail(AccountId),
    Categories,
    Transactions,
    Charts,
}

impl Route {
    /// Map a path to a page
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["accounts"] => Route::Accounts,
            ["account", id] => match id.parse() {
                Ok(id) => Route::AccountDetail(id),
                Err(_) => Route::Dashboard,
            },
            ["categories"] => Route::Categories,
            ["transactions"] => Route::Transactions,
            ["charts"] => Route::Charts,
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Accounts => "/accounts".to_string(),
            Route::AccountDetail(id) => format!("/account/{}", id),
            Route::Categories => "/categories".to_string(),
            Route::Transactions => "/transactions".to_string(),
            Route::Charts => "/charts".to_string(),
        }
    }

    /// Pages only reachable while logged out
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// Pages that need a session
    pub fn is_protected(&self) -> bool {
        !self.is_auth_page()
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolve the page actually shown for `requested`
pub fn guard(requested: Route, session: &Session) -> Route {
    let authenticated = session.is_authenticated();

    if requested.is_protected() && !authenticated {
        Route::Login
    } else if requested.is_auth_page() && authenticated {
        Route::Dashboard
    } else {
        requested
    }
}

/// Something that can move the client to another page
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Records the current page, applying the guard on every move
pub struct Router {
    session: Session,
    current: RwLock<Route>,
}

impl Router {
    /// Router starting at the entry point
    pub fn new(session: Session) -> Self {
        let start = guard(Route::Login, &session);
        Self {
            session,
            current: RwLock::new(start),
        }
    }

    pub fn current(&self) -> Route {
        match self.current.read() {
            Ok(route) => *route,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Navigate and return the page that was actually reached
    pub fn open(&self, requested: Route) -> Route {
        let resolved = guard(requested, &self.session);
        if resolved != requested {
            tracing::debug!(requested = %requested, resolved = %resolved, "Navigation redirected");
        }

        match self.current.write() {
            Ok(mut current) => *current = resolved,
            Err(poisoned) => *poisoned.into_inner() = resolved,
        }
        resolved
    }

    /// True once the guard has sent the client back to the login page
    pub fn at_login(&self) -> bool {
        self.current() == Route::Login
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        self.open(route);
    }
}
