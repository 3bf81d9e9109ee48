//! Pre-navigation guard.
//!
//! Rules, evaluated in order; the first that applies decides:
//!
//! 1. auth required, nobody logged in → login, with `redirect=<attempted path>`
//! 2. public target, somebody logged in, target is login/register → dashboard
//! 3. auth required, logged in, role set declared, role not in it → dashboard
//! 4. auth required, logged in → live session validation; invalid → login
//! 5. otherwise proceed

use crate::auth::AuthClient;
use crate::routes::{DASHBOARD_ROUTE, LOGIN_ROUTE, Location, REGISTER_ROUTE, ResolvedRoute};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Location),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    auth: AuthClient,
}

impl RouteGuard {
    pub fn new(auth: AuthClient) -> Self {
        Self { auth }
    }

    pub async fn before_each(&self, to: &ResolvedRoute) -> GuardDecision {
        let session = self.auth.session();
        let auth_required = to.meta.requires_auth();
        let authenticated = session.is_authenticated();

        if auth_required && !authenticated {
            tracing::debug!(to = to.name, "not logged in; redirecting to login");
            return GuardDecision::Redirect(
                Location::named(LOGIN_ROUTE).with_query("redirect", to.full_path()),
            );
        }

        if !auth_required && authenticated && (to.name == LOGIN_ROUTE || to.name == REGISTER_ROUTE) {
            tracing::debug!(to = to.name, "already logged in; redirecting to dashboard");
            return GuardDecision::Redirect(Location::named(DASHBOARD_ROUTE));
        }

        if auth_required && authenticated {
            if let Some(roles) = &to.meta.required_roles {
                if !session.has_any_role(roles) {
                    tracing::debug!(
                        to = to.name,
                        role = ?session.role(),
                        "role not allowed; redirecting to dashboard"
                    );
                    return GuardDecision::Redirect(Location::named(DASHBOARD_ROUTE));
                }
            }

            if !self.auth.validate_session().await {
                tracing::debug!(to = to.name, "session no longer valid; redirecting to login");
                return GuardDecision::Redirect(Location::named(LOGIN_ROUTE));
            }
        }

        GuardDecision::Proceed
    }
}
