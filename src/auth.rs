// Auth submission flows
// Sign-in and registration: validate locally, call the Remote API, then refresh the session,
// notify and navigate

use crate::api::{ApiError, RegisterRequest, SignInRequest};
use crate::context::AppContext;
use crate::notification::ToastKind;
use crate::routes::Route;
use crate::validation::{FieldSpec, FieldView, Form, FormError, InputType, Rule};
use tracing::{debug, info, warn};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const CONFIRM_PASSWORD: &str = "confirmPassword";

pub const REGISTER_SUCCESS: &str = "Registration Success!";
pub const SIGN_IN_SUCCESS: &str = "Sign in Successful!";
pub const SIGN_OUT_SUCCESS: &str = "Signed Out!";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    // Local validation failed; nothing was sent
    Invalid,
    Succeeded { redirect: Route },
    Rejected { message: String },
}

// State machine shared by both forms
#[derive(Debug, Clone)]
struct AuthFlow {
    form: Form,
    phase: SubmitPhase,
}

impl AuthFlow {
    fn new(form: Form) -> Self {
        Self {
            form,
            phase: SubmitPhase::Idle,
        }
    }

    fn edit(&mut self, name: &str, value: String) -> Result<(), FormError> {
        if matches!(self.phase, SubmitPhase::Succeeded | SubmitPhase::Rejected) {
            self.phase = SubmitPhase::Idle;
        }
        self.form.set_value(name, value)
    }

    /// Idle -> Validating -> Submitting, or back to Idle when a field fails.
    fn begin(&mut self) -> bool {
        self.phase = SubmitPhase::Validating;
        if !self.form.validate() {
            self.phase = SubmitPhase::Idle;
            return false;
        }
        self.phase = SubmitPhase::Submitting;
        true
    }

    fn finish(&mut self, result: &Result<(), ApiError>) {
        self.phase = match result {
            Ok(()) => SubmitPhase::Succeeded,
            Err(_) => SubmitPhase::Rejected,
        };
    }
}

/// The sign-in form. A rejected attempt marks both credential fields with the
/// same generic error, whichever one the server objected to.
#[derive(Debug, Clone)]
pub struct SignInForm {
    flow: AuthFlow,
}

impl Default for SignInForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInForm {
    pub fn new() -> Self {
        let form = Form::new(vec![
            FieldSpec::new(EMAIL, "Email", InputType::Email)
                .placeholder("Enter your email")
                .required(),
            FieldSpec::new(PASSWORD, "Password", InputType::Password)
                .placeholder("Enter your password")
                .required(),
        ]);
        Self {
            flow: AuthFlow::new(form),
        }
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.flow.edit(name, value.into())
    }

    pub fn phase(&self) -> SubmitPhase {
        self.flow.phase
    }

    pub fn form(&self) -> &Form {
        &self.flow.form
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.flow.form.field_views()
    }

    pub async fn submit(&mut self, ctx: &AppContext) -> SubmitOutcome {
        if !self.flow.begin() {
            debug!("sign-in form invalid, not submitting");
            return SubmitOutcome::Invalid;
        }

        let request = SignInRequest {
            email: self.flow.form.value_or_empty(EMAIL),
            password: self.flow.form.value_or_empty(PASSWORD),
        };
        info!(email = %request.email, "signing in");

        let result = ctx.api().sign_in(&request).await;
        self.flow.finish(&result);

        match result {
            Ok(()) => {
                self.flow.form.set_server_rejected(false);
                ctx.notifier().notify(SIGN_IN_SUCCESS, ToastKind::Success);
                ctx.session().refresh(ctx.api()).await;

                let redirect = ctx.navigator().origin_route().unwrap_or(Route::Home);
                info!(redirect = %redirect, "sign-in succeeded");
                ctx.navigator().go_to(redirect.clone());
                SubmitOutcome::Succeeded { redirect }
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "sign-in rejected");
                ctx.notifier().notify(&message, ToastKind::Error);

                self.flow.form.set_server_rejected(true);
                for field in [EMAIL, PASSWORD] {
                    if let Err(e) = self.flow.form.set_error(field, INVALID_CREDENTIALS) {
                        warn!(error = %e, "could not flag credential field");
                    }
                }
                SubmitOutcome::Rejected { message }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    flow: AuthFlow,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterForm {
    pub fn new() -> Self {
        let form = Form::new(vec![
            FieldSpec::new(FIRST_NAME, "First Name", InputType::Text)
                .placeholder("Enter your first name")
                .required(),
            FieldSpec::new(LAST_NAME, "Last Name", InputType::Text)
                .placeholder("Enter your last name")
                .required(),
            FieldSpec::new(EMAIL, "Email", InputType::Email)
                .placeholder("Enter your email")
                .required(),
            FieldSpec::new(PASSWORD, "Password", InputType::Password)
                .placeholder("Enter your password")
                .required()
                .rule(Rule::min_length(
                    MIN_PASSWORD_LENGTH,
                    "Password must be at least 6 characters",
                )),
            FieldSpec::new(CONFIRM_PASSWORD, "Confirm Password", InputType::Password)
                .placeholder("Confirm your password")
                .required()
                .rule(Rule::matches(PASSWORD, "Passwords do not match")),
        ]);
        Self {
            flow: AuthFlow::new(form),
        }
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.flow.edit(name, value.into())
    }

    pub fn phase(&self) -> SubmitPhase {
        self.flow.phase
    }

    pub fn form(&self) -> &Form {
        &self.flow.form
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.flow.form.field_views()
    }

    pub async fn submit(&mut self, ctx: &AppContext) -> SubmitOutcome {
        if !self.flow.begin() {
            debug!("register form invalid, not submitting");
            return SubmitOutcome::Invalid;
        }

        let form = &self.flow.form;
        let request = RegisterRequest {
            first_name: form.value_or_empty(FIRST_NAME),
            last_name: form.value_or_empty(LAST_NAME),
            email: form.value_or_empty(EMAIL),
            password: form.value_or_empty(PASSWORD),
        };
        info!(email = %request.email, "registering");

        let result = ctx.api().register(&request).await;
        self.flow.finish(&result);

        match result {
            Ok(()) => {
                ctx.notifier().notify(REGISTER_SUCCESS, ToastKind::Success);
                ctx.session().refresh(ctx.api()).await;
                ctx.navigator().go_to(Route::Home);
                SubmitOutcome::Succeeded {
                    redirect: Route::Home,
                }
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "registration rejected");
                ctx.notifier().notify(&message, ToastKind::Error);
                SubmitOutcome::Rejected { message }
            }
        }
    }
}

/// Ends the remote session, then re-validates so the store reflects it.
pub async fn sign_out(ctx: &AppContext) -> Result<(), ApiError> {
    match ctx.api().sign_out().await {
        Ok(()) => {
            ctx.session().refresh(ctx.api()).await;
            ctx.notifier().notify(SIGN_OUT_SUCCESS, ToastKind::Success);
            info!("signed out");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "sign-out failed");
            ctx.notifier().notify(&e.user_message(), ToastKind::Error);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_api::MockRemoteApi;
    use crate::context::test_support::harness;
    use crate::navigation::Navigator;
    use crate::session::AuthStatus;

    fn rejected(message: &str) -> ApiError {
        ApiError::Rejected {
            status_code: 400,
            message: message.to_string(),
        }
    }

    fn register_form(password: &str, confirm: &str) -> RegisterForm {
        let mut form = RegisterForm::new();
        form.set_value(FIRST_NAME, "Ann").unwrap();
        form.set_value(LAST_NAME, "Lee").unwrap();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, password).unwrap();
        form.set_value(CONFIRM_PASSWORD, confirm).unwrap();
        form
    }

    #[tokio::test]
    async fn test_register_password_mismatch_never_calls_api() {
        let h = harness(MockRemoteApi::new());
        let mut form = register_form("secret1", "secret2");

        let outcome = form.submit(&h.context).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert_eq!(
            form.form().errors(),
            vec![(CONFIRM_PASSWORD, "Passwords do not match")]
        );
        assert_eq!(MockRemoteApi::calls(&h.api.register_calls), 0);
        assert!(h.toasts.last().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_missing_email_never_calls_api() {
        let h = harness(MockRemoteApi::new());
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "").unwrap();
        form.set_value(PASSWORD, "x").unwrap();

        let outcome = form.submit(&h.context).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(form.form().errors(), vec![(EMAIL, "Email is required")]);
        assert_eq!(MockRemoteApi::calls(&h.api.sign_in_calls), 0);
    }

    #[tokio::test]
    async fn test_rejected_sign_in_flags_both_fields() {
        let api = MockRemoteApi::new();
        api.fail_sign_in(rejected("Invalid Credentials"));
        let h = harness(api);
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "wrong-password").unwrap();

        let outcome = form.submit(&h.context).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: "Invalid Credentials".to_string()
            }
        );
        assert_eq!(form.phase(), SubmitPhase::Rejected);
        assert_eq!(form.form().error(EMAIL), Some(INVALID_CREDENTIALS));
        assert_eq!(form.form().error(PASSWORD), Some(INVALID_CREDENTIALS));
        assert!(form.field_views().iter().all(|v| v.invalid));

        let toast = h.toasts.last().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Invalid Credentials");
        assert_eq!(h.navigator.current_route(), Route::Home);
        assert_eq!(h.navigator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_reported_like_rejection() {
        let api = MockRemoteApi::new();
        api.fail_sign_in(ApiError::NetworkError("connection refused".to_string()));
        let h = harness(api);
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "secret1").unwrap();

        let outcome = form.submit(&h.context).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert_eq!(
            h.toasts.last().unwrap().message,
            "Network error: connection refused"
        );
        assert_eq!(form.form().error(PASSWORD), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_rejection_styling_persists_until_successful_submit() {
        let api = MockRemoteApi::new();
        api.fail_sign_in(rejected("Invalid Credentials"));
        let h = harness(api);
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "wrong-password").unwrap();
        form.submit(&h.context).await;

        // Editing returns to Idle and clears the edited field's error, but
        // the rejection styling stays on every field.
        form.set_value(PASSWORD, "another-try").unwrap();
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert_eq!(form.form().error(PASSWORD), None);
        assert_eq!(form.form().error(EMAIL), Some(INVALID_CREDENTIALS));
        assert!(form.field_views().iter().all(|v| v.invalid));

        h.api.fail_sign_in(rejected("still wrong"));
        form.submit(&h.context).await;
        assert!(form.form().server_rejected());
        assert_eq!(MockRemoteApi::calls(&h.api.sign_in_calls), 2);
    }

    #[tokio::test]
    async fn test_sign_in_returns_to_origin_route() {
        let h = harness(MockRemoteApi::new());
        h.context.start().await;
        let shown = h
            .navigator
            .visit(Route::MyBookings, &h.context.session().status());
        assert_eq!(shown, Route::SignIn);

        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "secret1").unwrap();
        let outcome = form.submit(&h.context).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Succeeded {
                redirect: Route::MyBookings
            }
        );
        assert_eq!(h.navigator.current_route(), Route::MyBookings);
        assert!(h.context.session().is_logged_in());
        assert_eq!(h.toasts.last().unwrap().message, SIGN_IN_SUCCESS);
        assert!(!form.form().server_rejected());
        assert_eq!(form.phase(), SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_sign_in_without_origin_lands_on_root() {
        let h = harness(MockRemoteApi::new());
        h.navigator.go_to(Route::SignIn);
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "secret1").unwrap();

        let outcome = form.submit(&h.context).await;
        assert_eq!(outcome, SubmitOutcome::Succeeded { redirect: Route::Home });
        assert_eq!(h.navigator.current_route(), Route::Home);

        let sent = h.api.last_sign_in.lock().clone().unwrap();
        assert_eq!(sent.email, "a@b.com");
        assert_eq!(sent.password, "secret1");
    }

    #[tokio::test]
    async fn test_successful_sign_in_clears_rejection_flag() {
        let api = MockRemoteApi::new();
        api.fail_sign_in(rejected("Invalid Credentials"));
        let h = harness(api);
        let mut form = SignInForm::new();
        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "wrong-password").unwrap();
        form.submit(&h.context).await;
        assert!(form.form().server_rejected());

        h.api.clear_failures();
        form.set_value(PASSWORD, "secret1").unwrap();
        let outcome = form.submit(&h.context).await;

        assert!(matches!(outcome, SubmitOutcome::Succeeded { .. }));
        assert!(!form.form().server_rejected());
        assert!(form.field_views().iter().all(|v| !v.invalid));
    }

    #[tokio::test]
    async fn test_register_success_goes_home_and_notifies() {
        let h = harness(MockRemoteApi::new());
        let mut form = register_form("secret1", "secret1");

        let outcome = form.submit(&h.context).await;

        assert_eq!(outcome, SubmitOutcome::Succeeded { redirect: Route::Home });
        assert_eq!(h.navigator.current_route(), Route::Home);
        let toast = h.toasts.last().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, REGISTER_SUCCESS);
        assert!(h.context.session().is_logged_in());

        let sent = h.api.last_register.lock().clone().unwrap();
        assert_eq!(sent.first_name, "Ann");
        assert_eq!(sent.last_name, "Lee");
        assert_eq!(sent.password, "secret1");
    }

    #[tokio::test]
    async fn test_register_rejection_only_notifies() {
        let api = MockRemoteApi::new();
        api.fail_register(rejected("User already exists"));
        let h = harness(api);
        let mut form = register_form("secret1", "secret1");

        let outcome = form.submit(&h.context).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: "User already exists".to_string()
            }
        );
        assert!(form.form().errors().is_empty());
        assert!(!form.form().server_rejected());
        assert_eq!(h.toasts.last().unwrap().message, "User already exists");
        assert_eq!(form.phase(), SubmitPhase::Rejected);
    }

    #[tokio::test]
    async fn test_editing_password_rechecks_confirmation() {
        let h = harness(MockRemoteApi::new());
        let api_calls = || MockRemoteApi::calls(&h.api.register_calls);
        let mut form = register_form("secret1", "secret1");
        form.set_value(EMAIL, "").unwrap();
        assert_eq!(form.submit(&h.context).await, SubmitOutcome::Invalid);
        assert_eq!(form.form().error(CONFIRM_PASSWORD), None);

        form.set_value(EMAIL, "a@b.com").unwrap();
        form.set_value(PASSWORD, "secret9").unwrap();
        assert_eq!(form.submit(&h.context).await, SubmitOutcome::Invalid);
        assert_eq!(
            form.form().error(CONFIRM_PASSWORD),
            Some("Passwords do not match")
        );
        assert_eq!(api_calls(), 0);

        form.set_value(CONFIRM_PASSWORD, "secret9").unwrap();
        assert!(matches!(
            form.submit(&h.context).await,
            SubmitOutcome::Succeeded { .. }
        ));
        assert_eq!(api_calls(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_refreshes_session() {
        let h = harness(MockRemoteApi::logged_in_as("u-1"));
        h.context.start().await;
        assert!(h.context.session().is_logged_in());

        tokio_test::assert_ok!(sign_out(&h.context).await);

        assert_eq!(h.context.session().status(), AuthStatus::Unauthenticated);
        assert_eq!(h.toasts.last().unwrap().message, SIGN_OUT_SUCCESS);
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let api = MockRemoteApi::logged_in_as("u-1");
        api.fail_sign_out(ApiError::Timeout(10_000));
        let h = harness(api);
        h.context.start().await;

        let error = tokio_test::assert_err!(sign_out(&h.context).await);

        assert_eq!(error, ApiError::Timeout(10_000));
        assert!(h.context.session().is_logged_in());
        assert_eq!(h.toasts.last().unwrap().kind, ToastKind::Error);
    }
}
