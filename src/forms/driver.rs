//! Driver create/edit form
//!
//! Password fields are write-only: they always load empty, are required only
//! when creating, and are left out of the payload when blank so the backend
//! keeps the current password on edit.

use async_trait::async_trait;

use super::controller::EntityForm;
use super::validation::{Candidate, Check, Pattern, Rule, RuleSet, ValidationErrors};
use super::FormValues;
use crate::api::{AdminApi, ApiError, EntityKind};
use crate::models::{Driver, DriverPayload, Role};

pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn creating(candidate: &Candidate<'_>) -> bool {
    candidate.is_create()
}

fn password_supplied(candidate: &Candidate<'_>) -> bool {
    candidate.is_supplied(fields::PASSWORD)
}

fn confirmation_matches(candidate: &Candidate<'_>) -> bool {
    candidate.value(fields::PASSWORD) == candidate.value(fields::PASSWORD_CONFIRMATION)
}

pub struct DriverForm;

#[async_trait]
impl EntityForm for DriverForm {
    type Entity = Driver;
    type Payload = DriverPayload;

    const KIND: EntityKind = EntityKind::Driver;

    fn defaults() -> FormValues {
        [
            fields::NAME,
            fields::EMAIL,
            fields::PHONE,
            fields::ADDRESS,
            fields::PASSWORD,
            fields::PASSWORD_CONFIRMATION,
        ]
        .into_iter()
        .map(|field| (field, ""))
        .collect()
    }

    fn values_from(driver: &Driver) -> FormValues {
        Self::defaults()
            .with(fields::NAME, driver.name.clone())
            .with(fields::EMAIL, driver.email.clone())
            .with(fields::PHONE, driver.phone().unwrap_or_default())
            .with(fields::ADDRESS, driver.address().unwrap_or_default())
    }

    fn rules() -> RuleSet {
        RuleSet::new()
            .rule(Rule::new(fields::NAME, Check::MinLength(3), "Name must be at least 3 characters"))
            .rule(Rule::new(fields::EMAIL, Check::Required, "Email is required"))
            .rule(Rule::new(
                fields::EMAIL,
                Check::Pattern(Pattern::Email),
                "Please enter a valid email address",
            ))
            .rule(Rule::new(fields::PASSWORD, Check::Required, "Password is required").when(creating))
            .rule(
                Rule::new(
                    fields::PASSWORD,
                    Check::MinLength(MIN_PASSWORD_LENGTH),
                    format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
                )
                .if_present(),
            )
            .rule(
                Rule::new(
                    fields::PASSWORD_CONFIRMATION,
                    Check::Satisfies(confirmation_matches),
                    "Passwords do not match",
                )
                .when(password_supplied),
            )
    }

    fn payload(values: &FormValues) -> Result<DriverPayload, ValidationErrors> {
        let password = values
            .is_supplied(fields::PASSWORD)
            .then(|| values.get(fields::PASSWORD).to_string());
        let password_confirmation = password
            .as_ref()
            .map(|_| values.get(fields::PASSWORD_CONFIRMATION).to_string());

        Ok(DriverPayload {
            name: values.get(fields::NAME).trim().to_string(),
            email: values.get(fields::EMAIL).trim().to_string(),
            role: Role::Driver,
            phone: values.non_blank(fields::PHONE),
            address: values.non_blank(fields::ADDRESS),
            password,
            password_confirmation,
        })
    }

    async fn fetch(api: &dyn AdminApi, id: u64) -> Result<Driver, ApiError> {
        api.get_driver(id).await
    }

    async fn create(api: &dyn AdminApi, payload: &DriverPayload) -> Result<(), ApiError> {
        api.create_driver(payload).await
    }

    async fn update(api: &dyn AdminApi, id: u64, payload: &DriverPayload) -> Result<(), ApiError> {
        api.update_driver(id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{driver, FakeApi};
    use crate::cache::QueryCache;
    use crate::forms::{FormController, FormMode, SubmitOutcome};
    use serde_json::json;

    fn budi() -> FormValues {
        DriverForm::defaults()
            .with(fields::NAME, "Budi")
            .with(fields::EMAIL, "budi@example.com")
    }

    #[test]
    fn test_create_requires_password() {
        let errors = DriverForm::rules().validate(&budi(), FormMode::Create);
        assert_eq!(errors.fields(), vec![fields::PASSWORD]);
        assert_eq!(errors.get(fields::PASSWORD), Some("Password is required"));
    }

    #[test]
    fn test_edit_allows_blank_password_and_omits_it() {
        let values = budi().with(fields::PASSWORD_CONFIRMATION, "leftover");
        assert!(DriverForm::rules().validate(&values, FormMode::Edit(7)).is_empty());

        let body = serde_json::to_value(DriverForm::payload(&values).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({ "name": "Budi", "email": "budi@example.com", "role": "driver" })
        );
    }

    #[test]
    fn test_password_length_then_confirmation() {
        let short = budi()
            .with(fields::PASSWORD, "abc1234")
            .with(fields::PASSWORD_CONFIRMATION, "abc1234");
        let errors = DriverForm::rules().validate(&short, FormMode::Edit(7));
        assert_eq!(errors.fields(), vec![fields::PASSWORD]);
        assert_eq!(errors.get(fields::PASSWORD), Some("Password must be at least 8 characters"));

        let mismatch = budi()
            .with(fields::PASSWORD, "abc12345")
            .with(fields::PASSWORD_CONFIRMATION, "abc12346");
        let errors = DriverForm::rules().validate(&mismatch, FormMode::Create);
        assert_eq!(errors.fields(), vec![fields::PASSWORD_CONFIRMATION]);
        assert_eq!(errors.get(fields::PASSWORD_CONFIRMATION), Some("Passwords do not match"));
    }

    #[test]
    fn test_email_rules() {
        let errors = DriverForm::rules().validate(&budi().with(fields::EMAIL, ""), FormMode::Edit(1));
        assert_eq!(errors.get(fields::EMAIL), Some("Email is required"));

        let errors =
            DriverForm::rules().validate(&budi().with(fields::EMAIL, "budi.example.com"), FormMode::Edit(1));
        assert_eq!(errors.get(fields::EMAIL), Some("Please enter a valid email address"));
    }

    #[tokio::test]
    async fn test_edit_loads_blank_passwords_and_updates() {
        let api = FakeApi::with_drivers(vec![driver(7, "Budi")]);
        let cache = QueryCache::new();
        let mut form = FormController::<DriverForm>::new(FormMode::Edit(7));
        form.load(&api, &cache).await;

        assert_eq!(form.value(fields::NAME), "Budi");
        assert_eq!(form.value(fields::PASSWORD), "");
        assert_eq!(form.value(fields::PHONE), "");

        form.set_value(fields::PHONE, "0812 3456");
        let outcome = form.submit(&api, &cache).await;
        assert!(matches!(outcome, SubmitOutcome::Settled(_)));
        assert_eq!(api.calls(), vec!["GET /driver/7", "PUT /driver/7"]);
        let body = &api.payloads()[0];
        assert_eq!(body["phone"], json!("0812 3456"));
        assert!(body.get("password").is_none());
        assert!(body.get("password_confirmation").is_none());
    }

    #[tokio::test]
    async fn test_create_with_empty_password_makes_no_call() {
        let api = FakeApi::default();
        let cache = QueryCache::new();
        let mut form = FormController::<DriverForm>::new(FormMode::Create);
        form.load(&api, &cache).await;
        form.set_value(fields::NAME, "Budi");
        form.set_value(fields::EMAIL, "budi@example.com");

        let outcome = form.submit(&api, &cache).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert!(api.calls().is_empty());
        assert_eq!(form.field_error(fields::PASSWORD), Some("Password is required"));
    }
}
