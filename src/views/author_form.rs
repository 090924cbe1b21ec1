//! Form for adding an author.

use tracing::{debug, info};

use crate::{
    error::{
        domain::{FieldErrors, FormError},
        operational::ErrorReporter,
    },
    library::{
        client::CatalogApi,
        models::{Author, AuthorRequest},
    },
    notification::Notification,
    state::app_state::AppState,
    views::form::{FormField, check_date, require},
};

/// Headline of the failure notification.
pub const AUTHOR_ERROR_HEADLINE: &str = "Error adding author";

/// Message of the success notification.
pub const AUTHOR_ADDED_MESSAGE: &str = "Author added successfully";

/// Inputs of the add-author form. Everything but the death date is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorForm {
    pub first_name: FormField,
    pub last_name: FormField,
    pub citizenship: FormField,
    pub date_of_birth: FormField,
    pub date_of_death: FormField,
}

impl AuthorForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn fields_mut(&mut self) -> [&mut FormField; 5] {
        [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.citizenship,
            &mut self.date_of_birth,
            &mut self.date_of_death,
        ]
    }

    pub fn mark_all_as_touched(&mut self) {
        for field in self.fields_mut() {
            field.touched = true;
        }
    }

    pub fn reset(&mut self) {
        for field in self.fields_mut() {
            field.clear();
        }
    }

    /// Builds the request payload, or the errors keyed by API field name.
    ///
    /// # Errors
    ///
    /// Returns the field errors when a required field is blank or a date is
    /// malformed.
    pub fn validate(&self) -> Result<AuthorRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "first_name", &self.first_name);
        require(&mut errors, "last_name", &self.last_name);
        require(&mut errors, "citizenship", &self.citizenship);
        require(&mut errors, "date_of_birth", &self.date_of_birth);
        let date_of_birth = check_date(&mut errors, "date_of_birth", &self.date_of_birth);
        let date_of_death = check_date(&mut errors, "date_of_death", &self.date_of_death);

        if !errors.is_empty() {
            return Err(errors);
        }

        let text = |field: &FormField| field.text().unwrap_or_default().to_string();
        Ok(AuthorRequest {
            first_name: text(&self.first_name),
            last_name: text(&self.last_name),
            citizenship: text(&self.citizenship),
            date_of_birth,
            date_of_death,
        })
    }

    /// Validates and creates the author.
    ///
    /// An invalid form only marks every field touched; nothing is sent and
    /// nothing is notified. On success a success notification is pushed and
    /// the form is cleared. API failures are pushed as an error notification
    /// listing the first message of each rejected field.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` for local validation failures and
    /// `FormError::CatalogError` when the API rejects the request.
    pub async fn submit(&mut self, api: &dyn CatalogApi, state: &AppState) -> Result<Author, FormError> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(fields) => {
                self.mark_all_as_touched();
                debug!(errors = %fields.summary(), "Author form is invalid");
                return Err(FormError::Invalid { fields });
            }
        };

        match api.create_author(&request).await {
            Ok(author) => {
                info!(id = author.id, name = %author.display_name(), "Author added");
                state.notify(Notification::success(AUTHOR_ADDED_MESSAGE));
                self.reset();
                Ok(author)
            }
            Err(create_error) => {
                let duration_ms = state.settings.get_settings().notification_duration_ms;
                ErrorReporter::notify_failure(
                    &state.notifications,
                    AUTHOR_ERROR_HEADLINE,
                    &create_error,
                    duration_ms,
                );
                Err(create_error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc, time::Duration};

    use chrono::NaiveDate;

    use crate::{
        config::{ClientSettings, SettingsManager},
        error::domain::{CatalogError, FieldErrors, FormError},
        library::testing::FakeCatalog,
        notification::NotificationKind,
        state::app_state::AppState,
        views::{author_form::AuthorForm, form::REQUIRED_MESSAGE},
    };

    fn app_state() -> AppState {
        AppState::new(Arc::new(SettingsManager::from_settings(
            ClientSettings::default(),
            PathBuf::from("/nonexistent/settings.json"),
        )))
    }

    fn filled_form() -> AuthorForm {
        let mut form = AuthorForm::new();
        form.first_name.set("Stanisław");
        form.last_name.set("Lem");
        form.citizenship.set("Polish");
        form.date_of_birth.set("1921-09-12");
        form
    }

    #[test]
    fn test_validate_builds_request() {
        let request = filled_form().validate().unwrap();
        assert_eq!(request.last_name, "Lem");
        assert_eq!(request.date_of_birth, NaiveDate::from_ymd_opt(1921, 9, 12));
        assert_eq!(request.date_of_death, None);
    }

    #[test]
    fn test_validate_reports_required_fields() {
        let mut form = filled_form();
        form.citizenship.set("");
        form.date_of_death.set("2006-02-30");

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("citizenship"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
        assert!(errors.get("date_of_death").is_some());
        assert!(errors.get("first_name").is_none());
    }

    #[tokio::test]
    async fn test_invalid_submit_marks_touched_without_side_effects() {
        let fake = FakeCatalog::default();
        let state = app_state();
        let mut form = AuthorForm::new();

        let result = form.submit(&fake, &state).await;

        assert!(matches!(result, Err(FormError::Invalid { .. })));
        assert!(form.first_name.touched);
        assert!(form.date_of_death.touched);
        assert!(state.notifications.is_empty());
        assert!(fake.authors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_notifies_and_resets() {
        let fake = FakeCatalog::default();
        let state = app_state();
        let mut form = filled_form();

        let author = form.submit(&fake, &state).await.unwrap();

        assert_eq!(author.display_name(), "Stanisław Lem");
        assert_eq!(form, AuthorForm::new());
        let notification = state.notifications.peek_first().unwrap();
        assert_eq!(notification.message, "Author added successfully");
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.duration, Some(Duration::from_millis(3000)));
    }

    #[tokio::test]
    async fn test_rejected_submit_lists_field_errors() {
        let fake = FakeCatalog::default();
        let fields = FieldErrors::from_body(
            r#"{"last_name": ["Ensure this field has no more than 50 characters."], "citizenship": ["Unknown country."]}"#,
        )
        .unwrap();
        fake.fail_next(CatalogError::Validation { fields });
        let state = app_state();
        let mut form = filled_form();

        let result = form.submit(&fake, &state).await;

        assert!(matches!(result, Err(FormError::CatalogError(CatalogError::Validation { .. }))));
        let notification = state.notifications.peek_first().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(
            notification.message,
            "Error adding author\nlast_name: Ensure this field has no more than 50 characters.\ncitizenship: Unknown country."
        );
        assert_eq!(notification.duration, Some(Duration::from_millis(3000)));
        assert_eq!(form.last_name.value, "Lem");
    }
}
