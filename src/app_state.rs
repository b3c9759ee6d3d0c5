use std::sync::Arc;

use crate::{
    config::Config,
    store::{AccountStore, LoginAuditStore, UserStore},
};

/// Shared state handed to every handler. Stores are trait objects so the
/// router tests can swap in in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub audit: Arc<dyn LoginAuditStore>,
    pub config: Arc<Config>,
}
