//! Navigation signals emitted by the session layer.
//!
//! The crate does not render anything itself; it only tells the embedding
//! application where the user should land next. An external router decides
//! what to do with the signal, and gates protected routes on
//! [`SessionManager::is_authenticated`](crate::session::SessionManager::is_authenticated)
//! alone (token presence, no local validity check).

/// Entry points the session layer can route towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The login entry point, targeted after logout or a forced
    /// de-authentication.
    Login,
    /// The main task view, targeted after a successful login.
    Dashboard,
}

/// Receiver for navigation signals.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Default navigator that only records the signal in the log. Useful for
/// headless embeddings and as a stand-in until a real router is wired up.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        log::info!("navigation requested: {:?}", route);
    }
}
