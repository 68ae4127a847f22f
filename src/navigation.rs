// Navigation capability
// Routing itself belongs to the UI shell; flows only need to move between named routes

use crate::routes::Route;
use crate::session::AuthStatus;
use parking_lot::Mutex;
use tracing::{debug, info};

pub trait Navigator: Send + Sync + 'static {
    fn go_to(&self, route: Route);

    fn current_route(&self) -> Route;

    // The protected route the user was redirected away from, if any
    fn origin_route(&self) -> Option<Route>;
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<Route>,
    origin: Option<Route>,
}

/// In-memory history with the protected-route guard applied on `visit`.
#[derive(Debug)]
pub struct HistoryNavigator {
    state: Mutex<HistoryState>,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl HistoryNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![start],
                origin: None,
            }),
        }
    }

    /// A user-initiated visit (link click, typed URL). Protected routes
    /// require an authenticated session; while the session is still being
    /// validated the visit is let through. Returns the route actually shown.
    pub fn visit(&self, route: Route, status: &AuthStatus) -> Route {
        if route.is_protected() && status.is_authenticated() == Some(false) {
            info!(attempted = %route, "protected route requires sign-in, redirecting");
            let mut state = self.state.lock();
            state.origin = Some(route);
            state.entries.push(Route::SignIn);
            return Route::SignIn;
        }

        self.go_to(route.clone());
        route
    }

    pub fn history(&self) -> Vec<Route> {
        self.state.lock().entries.clone()
    }
}

impl Navigator for HistoryNavigator {
    fn go_to(&self, route: Route) {
        debug!(route = %route, "navigate");
        let mut state = self.state.lock();
        if route != Route::SignIn {
            state.origin = None;
        }
        state.entries.push(route);
    }

    fn current_route(&self) -> Route {
        let state = self.state.lock();
        state.entries.last().cloned().unwrap_or(Route::Home)
    }

    fn origin_route(&self) -> Option<Route> {
        self.state.lock().origin.clone()
    }
}
