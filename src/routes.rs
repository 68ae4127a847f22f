// Named application routes

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Search,
    SignIn,
    Register,
    MyBookings,
    MyHotels,
    AddHotel,
    Other(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Search => "/search",
            Route::SignIn => "/sign-in",
            Route::Register => "/register",
            Route::MyBookings => "/my-bookings",
            Route::MyHotels => "/my-hotels",
            Route::AddHotel => "/add-hotel",
            Route::Other(path) => path,
        }
    }

    pub fn from_path(path: &str) -> Self {
        match path {
            "" | "/" => Route::Home,
            "/search" => Route::Search,
            "/sign-in" => Route::SignIn,
            "/register" => Route::Register,
            "/my-bookings" => Route::MyBookings,
            "/my-hotels" => Route::MyHotels,
            "/add-hotel" => Route::AddHotel,
            other => Route::Other(other.to_string()),
        }
    }

    /// Routes that require an authenticated session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::MyBookings | Route::MyHotels | Route::AddHotel)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
