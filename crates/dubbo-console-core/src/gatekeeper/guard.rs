use std::sync::Arc;

use tracing::debug;

use crate::auth::CredentialStore;

/// Where unauthenticated navigation ends up unless configured otherwise
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Landing page after login when nothing else was requested
const HOME_PATH: &str = "/";

/// Something that can move the console to another page
pub trait Navigator {
    fn push(&mut self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Go where the user asked
    Proceed(String),
    /// Go to login instead, remembering where the user wanted to be
    Redirect { login_path: String, requested: String },
}

impl NavigationDecision {
    /// The page the navigator should actually show
    pub fn destination(&self) -> &str {
        match self {
            NavigationDecision::Proceed(path) => path,
            NavigationDecision::Redirect { login_path, .. } => login_path,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, NavigationDecision::Redirect { .. })
    }
}

/// Strip query string, fragment and trailing slash so `/login/` and
/// `/login?redirect=/service` compare equal to `/login`
fn route_of(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let route = &path[..end];
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        HOME_PATH
    } else {
        trimmed
    }
}

/// The whole redirect policy: no token and not already headed to login.
pub fn should_redirect(has_token: bool, target_path: &str, login_path: &str) -> bool {
    !has_token && route_of(target_path) != route_of(login_path)
}

/// Decides every route change against the credential store.
///
/// The guard only reads auth state. Logging in and out happen elsewhere.
pub struct NavigationGuard {
    credentials: Arc<CredentialStore>,
    login_path: String,
}

impl NavigationGuard {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self::with_login_path(credentials, DEFAULT_LOGIN_PATH)
    }

    /// Use a different login route, e.g. `/user/login`
    pub fn with_login_path(credentials: Arc<CredentialStore>, login_path: &str) -> Self {
        Self {
            credentials,
            login_path: login_path.to_string(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn guard_navigation(&self, current_path: &str, target_path: &str) -> NavigationDecision {
        let has_token = self.credentials.has_token();
        if should_redirect(has_token, target_path, &self.login_path) {
            debug!(from = current_path, to = target_path, "No session token, redirecting to login");
            NavigationDecision::Redirect {
                login_path: self.login_path.clone(),
                requested: target_path.to_string(),
            }
        } else {
            NavigationDecision::Proceed(target_path.to_string())
        }
    }

    /// Decide, then move the navigator to wherever the decision says
    pub fn navigate<N: Navigator + ?Sized>(
        &self,
        navigator: &mut N,
        current_path: &str,
        target_path: &str,
    ) -> NavigationDecision {
        let decision = self.guard_navigation(current_path, target_path);
        navigator.push(decision.destination());
        decision
    }

    /// Where to go once login succeeds: the page that was requested before
    /// the redirect, or home. Never back to login itself.
    pub fn post_login_target<'a>(&self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(path) if !path.is_empty() && route_of(path) != route_of(&self.login_path) => path,
            _ => HOME_PATH,
        }
    }
}
