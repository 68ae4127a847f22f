// Hotel booking client core
// Search criteria lifecycle and session-aware auth forms, driven by a UI shell

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod header;
pub mod navigation;
pub mod notification;
pub mod routes;
pub mod search;
pub mod search_form;
pub mod session;
pub mod validation;

// Re-export key types for convenience
pub use api::{ApiError, HttpRemoteApi, RegisterRequest, RemoteApi, SignInRequest, TokenValidation};
pub use auth::{sign_out, RegisterForm, SignInForm, SubmitOutcome, SubmitPhase};
pub use config::{ClientConfig, ConfigError};
pub use context::{AppContext, AppHandles, Clock};
pub use header::{nav_links, NavAction, NavLink};
pub use navigation::{HistoryNavigator, Navigator};
pub use notification::{Notifier, Toast, ToastCenter, ToastKind};
pub use routes::Route;
pub use search::{
    DateBounds, JsonFileStorage, SearchContext, SearchCriteria, SearchError, SearchStorage,
    StorageError,
};
pub use search_form::SearchForm;
pub use session::{AuthStatus, SessionStore};
pub use validation::{FieldSpec, FieldView, Form, FormError, InputType, Rule};
