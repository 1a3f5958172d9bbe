use std::sync::{Arc, Mutex};

use chrono::Duration;
use studyhub_shared::api::user::{ProfileUpdate, UserProfile};
use studyhub_shared::constants::SESSION_MAX_AGE_DAYS;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::navigator::Navigator;
use crate::route::Route;
use crate::status::SessionStatus;
use crate::storage::SessionSlot;

/// Single source of truth for "who is signed in".
///
/// The profile lives in two places: the in-memory status (published through
/// a `watch` channel so every subscribed view re-renders on change) and a
/// durable slot so a reload restores the session. Mutations hold a write
/// lock so the slot and the published status never disagree.
pub struct SessionStore {
    slot: Arc<dyn SessionSlot>,
    navigator: Arc<dyn Navigator>,
    max_age: Duration,
    write_lock: Mutex<()>,
    state_tx: watch::Sender<SessionStatus>,
    state_rx: watch::Receiver<SessionStatus>,
}

impl SessionStore {
    /// New store in the `Loading` state. Call [`Self::initialize`] before
    /// any guard decision is taken.
    pub fn new(slot: Arc<dyn SessionSlot>, navigator: Arc<dyn Navigator>) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionStatus::Loading);
        Self {
            slot,
            navigator,
            max_age: Duration::days(SESSION_MAX_AGE_DAYS),
            write_lock: Mutex::new(()),
            state_tx,
            state_rx,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, status: SessionStatus) {
        self.state_tx.send_replace(status);
    }

    /// Parse whatever the slot holds. Anything unreadable counts as "no session".
    fn read_slot(&self) -> Option<UserProfile> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "session slot read failed, treating as logged out");
                return None;
            }
        };
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "session slot holds unparseable data, treating as logged out");
                None
            }
        }
    }

    fn write_slot(&self, user: &UserProfile) -> Result<(), SessionError> {
        let json = serde_json::to_string(user)?;
        self.slot.write(&json, self.max_age)
    }

    /// Restore the session from the durable slot.
    ///
    /// Never fails: a missing, expired, or corrupted slot yields
    /// `Unauthenticated`.
    pub fn initialize(&self) -> SessionStatus {
        let _guard = self.lock_writes();
        let status = match self.read_slot() {
            Some(user) => {
                info!(identity = %user.identity, role = %user.role, "restored session");
                SessionStatus::Authenticated(user)
            }
            None => {
                debug!("no stored session");
                SessionStatus::Unauthenticated
            }
        };
        self.publish(status.clone());
        status
    }

    /// Adopt a profile returned by the auth service.
    ///
    /// Attributes shadowing typed fields are dropped so a reload restores
    /// exactly what was published. On a slot write failure the previous
    /// state is kept.
    pub fn login(&self, user: UserProfile) -> Result<(), SessionError> {
        let _guard = self.lock_writes();
        let user = user.without_reserved_attributes();
        self.write_slot(&user)?;
        info!(identity = %user.identity, role = %user.role, "signed in");
        self.publish(SessionStatus::Authenticated(user));
        Ok(())
    }

    /// Clear the session and hard-redirect to the login view.
    ///
    /// Always ends unauthenticated; a slot that refuses to clear is logged.
    pub fn logout(&self) {
        {
            let _guard = self.lock_writes();
            if let Err(e) = self.slot.clear() {
                warn!(error = %e, "failed to clear session slot");
            }
            if let SessionStatus::Authenticated(user) = &*self.state_rx.borrow() {
                info!(identity = %user.identity, "signed out");
            }
            self.publish(SessionStatus::Unauthenticated);
        }
        self.navigator.hard_redirect(Route::Login);
    }

    /// Save an edited profile. Idempotent: the same update twice stores the
    /// same profile as once.
    pub fn update_profile(
        &self,
        update: impl Into<ProfileUpdate>,
    ) -> Result<UserProfile, SessionError> {
        let _guard = self.lock_writes();
        let updated = match update.into() {
            ProfileUpdate::Replace(user) => user.without_reserved_attributes(),
            ProfileUpdate::Patch(patch) => {
                let mut user = self
                    .state_rx
                    .borrow()
                    .user()
                    .cloned()
                    .ok_or(SessionError::NotAuthenticated)?;
                patch.apply(&mut user);
                user
            }
        };
        self.write_slot(&updated)?;
        info!(identity = %updated.identity, "profile updated");
        self.publish(SessionStatus::Authenticated(updated.clone()));
        Ok(updated)
    }

    pub fn status(&self) -> SessionStatus {
        self.state_rx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state_rx.borrow().user().cloned()
    }

    /// Whether the durable slot currently holds a readable profile,
    /// independent of the in-memory status.
    pub fn is_authenticated(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Receiver notified on every login, logout, profile update and initialize.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.state_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::HistoryNavigator;
    use crate::storage::MemorySlot;
    use studyhub_shared::api::user::{ProfilePatch, Role};

    fn store() -> (SessionStore, Arc<MemorySlot>, Arc<HistoryNavigator>) {
        let slot = Arc::new(MemorySlot::new());
        let nav = Arc::new(HistoryNavigator::new());
        let store = SessionStore::new(slot.clone(), nav.clone());
        (store, slot, nav)
    }

    #[test]
    fn starts_loading() {
        let (store, _, _) = store();
        assert_eq!(store.status(), SessionStatus::Loading);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn initialize_with_empty_slot_is_unauthenticated() {
        let (store, _, _) = store();
        assert_eq!(store.initialize(), SessionStatus::Unauthenticated);
    }

    #[test]
    fn login_writes_slot_and_status() {
        let (store, slot, _) = store();
        store.initialize();
        let user = UserProfile::new("u1", Role::Student).with_display_name("Jane");
        store.login(user.clone()).unwrap();

        assert_eq!(store.current_user(), Some(user.clone()));
        let stored: UserProfile = serde_json::from_str(&slot.read().unwrap().unwrap()).unwrap();
        assert_eq!(stored, user);
        assert!(store.is_authenticated());
    }

    #[test]
    fn login_overwrites_previous_user() {
        let (store, _, _) = store();
        store.login(UserProfile::new("u1", Role::Student)).unwrap();
        store.login(UserProfile::new("u2", Role::Admin)).unwrap();
        assert_eq!(store.current_user().unwrap().identity.to_string(), "u2");
    }

    #[test]
    fn logout_redirects_to_login() {
        let (store, slot, nav) = store();
        store.login(UserProfile::new("u1", Role::Student)).unwrap();
        store.logout();
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert!(slot.read().unwrap().is_none());
        assert_eq!(nav.current(), Some(Route::Login));
    }

    #[test]
    fn patch_without_session_is_rejected() {
        let (store, slot, _) = store();
        store.initialize();
        let patch = ProfilePatch {
            department: Some("Physics".into()),
            ..Default::default()
        };
        match store.update_profile(patch) {
            Err(SessionError::NotAuthenticated) => {}
            other => panic!("expected NotAuthenticated, got: {other:?}"),
        }
        assert!(slot.read().unwrap().is_none());
    }

    #[test]
    fn replace_without_session_signs_in() {
        let (store, _, _) = store();
        store.initialize();
        let user = UserProfile::new(7, Role::Lecturer);
        store.update_profile(user.clone()).unwrap();
        assert_eq!(store.current_user(), Some(user));
    }

    #[test]
    fn patch_merges_into_current_profile() {
        let (store, _, _) = store();
        store
            .login(UserProfile::new("u1", Role::Student).with_names("Ama", "Owusu"))
            .unwrap();
        let updated = store
            .update_profile(ProfilePatch {
                department: Some("Mathematics".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.display_name(), "Ama Owusu");
        assert_eq!(updated.department(), Some("Mathematics"));
        assert_eq!(store.current_user(), Some(updated));
    }

    #[test]
    fn login_drops_attributes_shadowing_fields() {
        let (store, slot, _) = store();
        let mut user = UserProfile::new("u1", Role::Student);
        user.attributes
            .insert("name".into(), serde_json::Value::String("Jane Doe".into()));
        store.login(user).unwrap();

        let published = store.current_user().unwrap();
        assert!(published.attributes.is_empty());
        let stored: UserProfile = serde_json::from_str(&slot.read().unwrap().unwrap()).unwrap();
        assert_eq!(stored, published);
    }

    #[test]
    fn custom_max_age_is_kept() {
        let (store, _, _) = store();
        let store = store.with_max_age(Duration::hours(1));
        assert_eq!(store.max_age(), Duration::hours(1));
    }
}
