//! Explicit wiring of the session layer.
//!
//! There are no hidden singletons: the embedding application constructs one
//! [`Client`] at process start, injecting the credential store and the
//! navigator, and passes references to whoever needs them.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::navigation::Navigator;
use crate::session::{Session, SessionManager, SharedSession};
use crate::storage::CredentialStore;
use crate::tasks::TaskStore;
use crate::transport::{BearerAuth, Deauthorizer, Transport};

/// The assembled client: one session manager and one task repository sharing
/// a single transport pipeline.
pub struct Client {
    pub session: SessionManager,
    pub tasks: TaskStore,
}

impl Client {
    /// Builds the client against `config.base_url`, rehydrating the session
    /// token from the store. The profile stays absent until fetched.
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session: SharedSession = Arc::new(RwLock::new(Session {
            token: store.load(),
            user: None,
        }));

        let transport = Arc::new(
            Transport::new(config.base_url.clone())
                .with(Arc::new(BearerAuth::new(session.clone())))
                .with(Arc::new(Deauthorizer::new(
                    session.clone(),
                    store.clone(),
                    navigator.clone(),
                ))),
        );

        Self {
            session: SessionManager::new(session, store, transport.clone(), navigator),
            tasks: TaskStore::new(transport),
        }
    }
}
