//! Account operations: sign-up, sign-in, profile edits and erasure.

use skycast_auth::{Confirmer, Route, SessionContext};
use skycast_core::{Result, UserPreferences, ValidationError};
use std::sync::Arc;

use crate::client::ApiClient;
use crate::models::{ProfileUpdate, RegisterForm};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Local checks run before a sign-up form is sent.
pub fn validate_registration(form: &RegisterForm) -> std::result::Result<(), ValidationError> {
    if form.email.trim().is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if form.display_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("display name"));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Local checks run before a profile edit is sent.
pub fn validate_profile_update(update: &ProfileUpdate) -> std::result::Result<(), ValidationError> {
    if update.display_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("display name"));
    }
    if update.password != update.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if !update.password.is_empty() && update.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub struct AccountService {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    confirmer: Arc<dyn Confirmer>,
}

impl AccountService {
    pub fn new(
        api: Arc<ApiClient>,
        session: Arc<SessionContext>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            session,
            confirmer,
        }
    }

    /// Create an account; on success the user is sent to sign in.
    pub async fn register(&self, form: &RegisterForm) -> Result<String> {
        validate_registration(form)?;
        let message = self.api.register(form).await?;
        tracing::info!("Registered {}", form.email);
        self.session.navigate(Route::Login);
        Ok(message)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyField("password").into());
        }

        let token = self.api.login(email, password).await?;
        self.session.establish(token)?;
        self.session.navigate(Route::Dashboard);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        Ok(self.session.logout()?)
    }

    /// Current profile; served from the session cache when loaded.
    pub async fn profile(&self) -> Result<UserPreferences> {
        let token = self.session.require()?;
        if let Some(preferences) = self.session.preferences() {
            return Ok(preferences);
        }

        match self.api.get_user(&token).await {
            Ok(preferences) => {
                self.session.cache_preferences(&token, preferences.clone());
                Ok(preferences)
            }
            Err(e) => {
                self.session.handle_failure(&token, &e);
                Err(e)
            }
        }
    }

    /// Save a profile edit; the returned record replaces the cached one.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserPreferences> {
        validate_profile_update(update)?;
        let token = self.session.require()?;

        match self.api.update_user(&token, update).await {
            Ok(preferences) => {
                self.session.cache_preferences(&token, preferences.clone());
                tracing::info!("Profile updated");
                Ok(preferences)
            }
            Err(e) => {
                self.session.handle_failure(&token, &e);
                Err(e)
            }
        }
    }

    /// Erase the account after confirmation. Returns false if declined.
    pub async fn delete_account(&self) -> Result<bool> {
        let token = self.session.require()?;

        if !self.confirmer.confirm(
            "Are you sure you want to delete your account? This action cannot be undone.",
        ) {
            tracing::info!("Account deletion cancelled");
            return Ok(false);
        }

        if let Err(e) = self.api.delete_account(&token).await {
            self.session.handle_failure(&token, &e);
            return Err(e);
        }

        tracing::info!("Account deleted");
        self.session.logout()?;
        Ok(true)
    }
}
