// Session-aware header navigation

use crate::routes::Route;
use crate::session::AuthStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Go(Route),
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub action: NavAction,
}

/// Links shown next to the brand. Nothing auth-related is offered until the
/// session has been validated once.
pub fn nav_links(status: &AuthStatus) -> Vec<NavLink> {
    match status.is_authenticated() {
        Some(true) => vec![
            NavLink {
                label: "My Bookings",
                action: NavAction::Go(Route::MyBookings),
            },
            NavLink {
                label: "My Hotels",
                action: NavAction::Go(Route::MyHotels),
            },
            NavLink {
                label: "Sign Out",
                action: NavAction::SignOut,
            },
        ],
        Some(false) => vec![NavLink {
            label: "Sign In",
            action: NavAction::Go(Route::SignIn),
        }],
        None => Vec::new(),
    }
}
