//! Minimal client-side router: resolve, guard, follow redirects, commit.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::guard::{GuardDecision, RouteGuard};
use crate::routes::{Location, ResolvedRoute, RouteTable};

/// Upper bound on redirects followed by a single `push`.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),

    #[error("navigation to '{0}' exceeded {max} redirects", max = MAX_REDIRECTS)]
    RedirectLoop(String),
}

/// Outcome of a committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: ResolvedRoute,
    /// Full paths visited before landing, oldest first.
    pub redirected_from: Vec<String>,
}

#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
    current: Mutex<Option<ResolvedRoute>>,
}

impl Router {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self {
            table,
            guard,
            current: Mutex::new(None),
        }
    }

    /// The last committed route.
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `to`: route-level redirects apply first, then the guard
    /// decides; guard redirects restart the process at the new location.
    pub async fn push(&self, to: impl Into<Location>) -> Result<Navigation, NavigationError> {
        let requested = to.into();
        let mut location = requested.clone();
        let mut redirected_from = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let route = self
                .table
                .resolve(&location)
                .ok_or_else(|| NavigationError::NotFound(describe(&location)))?;

            if let Some(target) = route.redirect {
                redirected_from.push(route.full_path());
                location = redirect_target(target, &route.query);
                continue;
            }

            match self.guard.before_each(&route).await {
                GuardDecision::Proceed => {
                    tracing::debug!(to = %route.full_path(), hops = redirected_from.len(), "navigation committed");
                    *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(route.clone());
                    return Ok(Navigation {
                        route,
                        redirected_from,
                    });
                }
                GuardDecision::Redirect(next) => {
                    redirected_from.push(route.full_path());
                    location = next;
                }
            }
        }

        tracing::warn!(to = %describe(&requested), "redirect loop detected");
        Err(NavigationError::RedirectLoop(describe(&requested)))
    }
}

/// A route redirect keeps the incoming query unless the target brings its own.
fn redirect_target(target: &str, query: &[(String, String)]) -> Location {
    let location = Location::Path(target.to_string());
    if target.contains('?') {
        return location;
    }
    query
        .iter()
        .fold(location, |location, (key, value)| {
            location.with_query(key.as_str(), value.as_str())
        })
}

fn describe(location: &Location) -> String {
    match location {
        Location::Path(path) => path.clone(),
        Location::Named { name, .. } => format!("named route '{name}'"),
    }
}
