use crate::error::ApiError;
use crate::model::leave_request::LeaveRequest;
use crate::model::user::User;
use crate::store::JsonStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// Shared server-held state: the user registry, the leave-request log and the
/// store they persist through. Handlers share it as `web::Data<SharedState>`;
/// the coarse lock serializes mutating operations so two concurrent decisions
/// on the same pending request can never both land.
pub type SharedState = RwLock<AppState>;

pub struct AppState {
    pub users: HashMap<String, User>,
    pub leaves: Vec<LeaveRequest>,
    pub store: JsonStore,
}

impl AppState {
    pub fn load(store: JsonStore) -> anyhow::Result<Self> {
        let users = store.load_users()?;
        let leaves = store.load_requests()?;
        Ok(Self {
            users,
            leaves,
            store,
        })
    }

    pub fn user(&self, email: &str) -> Result<&User, ApiError> {
        self.users.get(email).ok_or(ApiError::NotFound("User"))
    }

    pub fn request(&self, id: u64) -> Result<&LeaveRequest, ApiError> {
        self.leaves
            .iter()
            .find(|l| l.id == id)
            .ok_or(ApiError::NotFound("Leave request"))
    }

    /// Next request id: max over all existing ids plus one, so holes left by
    /// cascade deletes are never refilled.
    pub fn next_request_id(&self) -> u64 {
        self.leaves.iter().map(|l| l.id).max().unwrap_or(0) + 1
    }

    pub fn persist_users(&self) -> Result<(), ApiError> {
        self.store.save_users(&self.users).map_err(ApiError::from)
    }

    pub fn persist_leaves(&self) -> Result<(), ApiError> {
        self.store
            .save_requests(&self.leaves)
            .map_err(ApiError::from)
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::store::{default_requests, default_users};
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("leave-portal-{}", uuid::Uuid::new_v4()))
    }

    fn fixture_over(dir: PathBuf) -> AppState {
        let store = JsonStore::new(dir.to_str().unwrap()).unwrap();
        AppState {
            users: default_users(),
            leaves: default_requests(),
            store,
        }
    }

    /// State over the seed fixture backed by a throwaway directory.
    pub fn fixture_state() -> AppState {
        fixture_over(temp_dir())
    }

    /// Fixture whose store cannot write either document: the target paths
    /// are occupied by directories, so every save fails.
    pub fn unwritable_state() -> AppState {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("users.json")).unwrap();
        std::fs::create_dir_all(dir.join("leaves.json")).unwrap();
        fixture_over(dir)
    }

    /// Fixture that can persist the leave log but not the user registry.
    pub fn unwritable_users_state() -> AppState {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("users.json")).unwrap();
        fixture_over(dir)
    }
}
