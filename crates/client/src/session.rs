//! The session store: who is logged in, and whether an auth call is in flight.
//!
//! Cheap to clone; every clone observes the same state. Reads are public,
//! mutation is reserved to the auth client and the request helper.

use std::sync::{Arc, PoisonError, RwLock};

use sara_auth::{Capability, Role, User, has_capability};

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    loading: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.user.is_some())
    }

    pub fn role(&self) -> Option<Role> {
        self.read(|s| s.user.as_ref().map(|u| u.role))
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading > 0)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|r| roles.contains(&r))
    }

    /// Capability check against the static table; false when logged out.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role().is_some_and(|r| has_capability(r, capability))
    }

    /// Every capability of the current user, in table order.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has_capability(*c))
            .collect()
    }

    pub fn can_manage_users(&self) -> bool {
        self.has_capability(Capability::ManageUsers)
    }

    pub fn can_manage_products(&self) -> bool {
        self.has_capability(Capability::ManageProducts)
    }

    pub fn can_manage_categories(&self) -> bool {
        self.has_capability(Capability::ManageCategories)
    }

    pub fn can_manage_movements(&self) -> bool {
        self.has_capability(Capability::ManageMovements)
    }

    pub fn can_manage_inventories(&self) -> bool {
        self.has_capability(Capability::ManageInventories)
    }

    pub fn can_view_products(&self) -> bool {
        self.has_capability(Capability::ViewProducts)
    }

    pub fn can_view_categories(&self) -> bool {
        self.has_capability(Capability::ViewCategories)
    }

    pub fn can_view_movements(&self) -> bool {
        self.has_capability(Capability::ViewMovements)
    }

    pub fn can_view_inventories(&self) -> bool {
        self.has_capability(Capability::ViewInventories)
    }

    pub fn can_view_reports(&self) -> bool {
        self.has_capability(Capability::ViewReports)
    }

    pub fn can_view_predictions(&self) -> bool {
        self.has_capability(Capability::ViewPredictions)
    }

    pub fn can_view_alerts(&self) -> bool {
        self.has_capability(Capability::ViewAlerts)
    }

    pub fn can_export(&self) -> bool {
        self.has_capability(Capability::Export)
    }

    pub(crate) fn set_user(&self, user: User) {
        self.write(|s| s.user = Some(user));
    }

    pub(crate) fn clear(&self) {
        self.write(|s| s.user = None);
    }

    /// Mark an auth call as in flight until the guard is dropped.
    pub(crate) fn begin_loading(&self) -> LoadingGuard {
        self.write(|s| s.loading += 1);
        LoadingGuard {
            store: self.clone(),
        }
    }

    // Locks are never held across an await point; poisoning is ignored since
    // the state has no multi-field invariant to break.
    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

/// Clears the loading flag on drop, whatever the outcome of the call.
#[must_use = "the loading flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub(crate) struct LoadingGuard {
    store: SessionStore,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.write(|s| s.loading = s.loading.saturating_sub(1));
    }
}
