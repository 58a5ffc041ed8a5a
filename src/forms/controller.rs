//! Create/edit lifecycle shared by every entity form
//!
//! ```text
//! Idle -> Loading (edit only) -> Ready -> Validating -> Submitting -> Settled
//!                                  ^                                   |
//!                                  +------------- failure -------------+
//! ```
//!
//! The controller owns candidate values and field errors. Network work is split
//! out into [`Submission`] so the TUI can run it on a background task while the
//! controller stays on the UI thread; [`FormController::submit`] chains the
//! three steps for callers that can simply await.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

use super::validation::{RuleSet, ValidationErrors};
use super::{FormMode, FormValues};
use crate::api::{AdminApi, ApiError, EntityKind};
use crate::cache::{CacheKey, QueryCache};
use crate::navigation::{Navigation, SuccessReason};

/// Everything entity-specific a [`FormController`] needs
#[async_trait]
pub trait EntityForm: Send + Sync + 'static {
    type Entity: Clone + Send + Sync + 'static;
    type Payload: Serialize + fmt::Debug + Send + Sync + 'static;

    const KIND: EntityKind;

    /// Values of a blank create form
    fn defaults() -> FormValues;

    /// Values of an edit form populated from a fetched entity
    fn values_from(entity: &Self::Entity) -> FormValues;

    fn rules() -> RuleSet;

    /// Build the outbound body from values that already passed validation
    fn payload(values: &FormValues) -> Result<Self::Payload, ValidationErrors>;

    async fn fetch(api: &dyn AdminApi, id: u64) -> Result<Self::Entity, ApiError>;
    async fn create(api: &dyn AdminApi, payload: &Self::Payload) -> Result<(), ApiError>;
    async fn update(api: &dyn AdminApi, id: u64, payload: &Self::Payload) -> Result<(), ApiError>;
}

/// Fetch one entity for an edit form, going through the shared cache
pub async fn fetch_entity<F: EntityForm>(
    api: &dyn AdminApi,
    cache: &QueryCache,
    id: u64,
) -> Result<F::Entity, ApiError> {
    cache
        .get_or_fetch(CacheKey::entity(F::KIND, id), || F::fetch(api, id))
        .await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Loading,
    Ready,
    Validating,
    Submitting,
    Settled(SuccessReason),
    /// Edit target does not exist
    NotFound,
    /// Edit target could not be fetched
    LoadFailed(String),
}

/// Result of [`FormController::begin_submit`]
pub enum SubmitStart<F: EntityForm> {
    /// A submission is already in flight or the form is not ready
    Blocked,
    Invalid(ValidationErrors),
    Ready(Submission<F>),
}

/// Result of [`FormController::settle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    Success(Navigation),
    /// Global, user-facing failure message
    Failure(String),
}

/// Result of [`FormController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored,
    Invalid(ValidationErrors),
    Settled(Settled),
}

/// A validated payload on its way to the backend
pub struct Submission<F: EntityForm> {
    mode: FormMode,
    payload: F::Payload,
    _form: PhantomData<fn() -> F>,
}

impl<F: EntityForm> Submission<F> {
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn payload(&self) -> &F::Payload {
        &self.payload
    }

    /// Perform the mutation; cached entries are invalidated only once it succeeds
    pub async fn send(self, api: &dyn AdminApi, cache: &QueryCache) -> Result<(), ApiError> {
        debug!("Sending {} {} payload: {:?}", self.mode.operation(), F::KIND, self.payload);

        match self.mode {
            FormMode::Create => F::create(api, &self.payload).await?,
            FormMode::Edit(id) => F::update(api, id, &self.payload).await?,
        }

        cache.invalidate(&CacheKey::list(F::KIND));
        if let FormMode::Edit(id) = self.mode {
            cache.invalidate(&CacheKey::entity(F::KIND, id));
        }
        Ok(())
    }
}

impl<F: EntityForm> fmt::Debug for Submission<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("kind", &F::KIND)
            .field("mode", &self.mode)
            .field("payload", &self.payload)
            .finish()
    }
}

/// State machine behind one create or edit form
pub struct FormController<F: EntityForm> {
    mode: FormMode,
    phase: FormPhase,
    values: FormValues,
    errors: ValidationErrors,
    global_error: Option<String>,
    rules: RuleSet,
    _form: PhantomData<fn() -> F>,
}

impl<F: EntityForm> FormController<F> {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            phase: FormPhase::Idle,
            values: F::defaults(),
            errors: ValidationErrors::default(),
            global_error: None,
            rules: F::rules(),
            _form: PhantomData,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn global_error(&self) -> Option<&str> {
        self.global_error.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == FormPhase::Ready
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Leave `Idle`. Returns the id to fetch in edit mode; create mode is ready at once.
    pub fn start_loading(&mut self) -> Option<u64> {
        if self.phase != FormPhase::Idle {
            return None;
        }

        match self.mode {
            FormMode::Create => {
                self.values = F::defaults();
                self.phase = FormPhase::Ready;
                None
            }
            FormMode::Edit(id) => {
                self.phase = FormPhase::Loading;
                Some(id)
            }
        }
    }

    pub fn finish_loading(&mut self, result: Result<F::Entity, ApiError>) {
        if self.phase != FormPhase::Loading {
            debug!("Ignoring load result for {} form in phase {:?}", F::KIND, self.phase);
            return;
        }

        match result {
            Ok(entity) => {
                self.values = F::values_from(&entity);
                self.phase = FormPhase::Ready;
            }
            Err(err) if err.is_not_found() => {
                warn!("{} {:?} not found", F::KIND.label(), self.mode.entity_id());
                self.phase = FormPhase::NotFound;
            }
            Err(err) => {
                warn!("Failed to load {} {:?}: {}", F::KIND, self.mode.entity_id(), err);
                let message =
                    err.user_message(|| format!("Failed to load {}. Please try again.", F::KIND));
                self.phase = FormPhase::LoadFailed(message);
            }
        }
    }

    /// Run the whole loading step in place
    pub async fn load(&mut self, api: &dyn AdminApi, cache: &QueryCache) {
        if let Some(id) = self.start_loading() {
            let result = fetch_entity::<F>(api, cache, id).await;
            self.finish_loading(result);
        }
    }

    /// Update one field; returns false when the form is not accepting input
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> bool {
        if self.phase != FormPhase::Ready {
            return false;
        }
        self.values.set(field, value);
        self.errors.remove(field);
        true
    }

    /// Validate the current values without submitting
    pub fn validate(&mut self) -> bool {
        self.errors = self.rules.validate(&self.values, self.mode);
        self.errors.is_empty()
    }

    pub fn begin_submit(&mut self) -> SubmitStart<F> {
        if self.phase != FormPhase::Ready {
            debug!("Submit ignored for {} form in phase {:?}", F::KIND, self.phase);
            return SubmitStart::Blocked;
        }

        self.phase = FormPhase::Validating;
        self.global_error = None;

        let payload = if self.validate() {
            F::payload(&self.values)
        } else {
            Err(self.errors.clone())
        };

        match payload {
            Ok(payload) => {
                self.phase = FormPhase::Submitting;
                SubmitStart::Ready(Submission {
                    mode: self.mode,
                    payload,
                    _form: PhantomData,
                })
            }
            Err(errors) => {
                debug!("{} form has {} invalid field(s)", F::KIND, errors.len());
                self.errors = errors.clone();
                self.phase = FormPhase::Ready;
                SubmitStart::Invalid(errors)
            }
        }
    }

    pub fn settle(&mut self, result: Result<(), ApiError>) -> Settled {
        match result {
            Ok(()) => {
                let reason = match self.mode {
                    FormMode::Create => SuccessReason::Created,
                    FormMode::Edit(_) => SuccessReason::Updated,
                };
                if self.mode.is_create() {
                    self.values = F::defaults();
                }
                self.errors.clear();
                self.global_error = None;
                self.phase = FormPhase::Settled(reason);
                info!("{} {}", F::KIND.label(), reason.as_str());
                Settled::Success(Navigation::to_list(F::KIND, reason))
            }
            Err(err) => {
                warn!("Failed to {} {}: {}", self.mode.operation(), F::KIND, err);
                let message = err.user_message(|| {
                    format!("Failed to {} {}. Please try again.", self.mode.operation(), F::KIND)
                });
                self.global_error = Some(message.clone());
                self.phase = FormPhase::Ready;
                Settled::Failure(message)
            }
        }
    }

    /// Validate, send and settle in one go
    pub async fn submit(&mut self, api: &dyn AdminApi, cache: &QueryCache) -> SubmitOutcome {
        match self.begin_submit() {
            SubmitStart::Blocked => SubmitOutcome::Ignored,
            SubmitStart::Invalid(errors) => SubmitOutcome::Invalid(errors),
            SubmitStart::Ready(submission) => {
                let result = submission.send(api, cache).await;
                SubmitOutcome::Settled(self.settle(result))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{travel, FakeApi};
    use crate::forms::travel::fields;
    use crate::forms::TravelForm;
    use crate::models::Travel;

    fn bali_trip() -> FormValues {
        TravelForm::defaults()
            .with(fields::TYPE, "tourism")
            .with(fields::TITLE, "Bali Trip")
            .with(fields::PRICE, "500000")
            .with(fields::DEPARTURE_DATE, "2025-01-10")
            .with(fields::CAPACITY, "4")
    }

    fn ready_form(mode: FormMode, values: FormValues) -> FormController<TravelForm> {
        let mut form = FormController::<TravelForm>::new(mode);
        form.phase = FormPhase::Ready;
        for (field, value) in values.iter() {
            form.set_value(field, value);
        }
        form
    }

    #[tokio::test]
    async fn test_create_submits_once_and_navigates() {
        let api = FakeApi::default();
        let cache = QueryCache::new();
        let mut form = FormController::<TravelForm>::new(FormMode::Create);
        form.load(&api, &cache).await;
        assert!(form.is_ready());
        for (field, value) in bali_trip().iter() {
            assert!(form.set_value(field, value));
        }

        let outcome = form.submit(&api, &cache).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Settled(Settled::Success(Navigation::to_list(
                EntityKind::Travel,
                SuccessReason::Created
            )))
        );
        assert_eq!(api.calls(), vec!["POST /admin/travel"]);
        let payload = &api.payloads()[0];
        assert_eq!(payload["price"], serde_json::json!(500000));
        assert_eq!(payload["capacity"], serde_json::json!(4));
        assert_eq!(form.phase(), &FormPhase::Settled(SuccessReason::Created));
        assert_eq!(form.values(), &TravelForm::defaults());
    }

    #[tokio::test]
    async fn test_invalid_values_issue_no_call() {
        let api = FakeApi::default();
        let cache = QueryCache::new();
        let mut form = ready_form(FormMode::Create, bali_trip().with(fields::DEPARTURE_DATE, "2024-13-40"));

        let outcome = form.submit(&api, &cache).await;

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.fields(), vec![fields::DEPARTURE_DATE]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(api.calls().is_empty());
        assert!(form.is_ready());
        assert!(form.field_error(fields::DEPARTURE_DATE).is_some());
    }

    #[test]
    fn test_submit_is_blocked_while_submitting() {
        let mut form = ready_form(FormMode::Create, bali_trip());

        assert!(matches!(form.begin_submit(), SubmitStart::Ready(_)));
        assert!(form.is_submitting());
        assert!(matches!(form.begin_submit(), SubmitStart::Blocked));
        assert!(!form.set_value(fields::TITLE, "Changed"));
        assert_eq!(form.value(fields::TITLE), "Bali Trip");
    }

    #[test]
    fn test_remote_failure_is_global_and_keeps_values() {
        let mut form = ready_form(FormMode::Edit(3), bali_trip());
        assert!(matches!(form.begin_submit(), SubmitStart::Ready(_)));

        let settled = form.settle(Err(ApiError::Status { status: 500, message: None }));

        assert_eq!(
            settled,
            Settled::Failure("Failed to update travel. Please try again.".to_string())
        );
        assert!(form.is_ready());
        assert!(form.errors().is_empty());
        assert_eq!(form.value(fields::TITLE), "Bali Trip");
        assert_eq!(form.global_error(), Some("Failed to update travel. Please try again."));

        assert!(matches!(form.begin_submit(), SubmitStart::Ready(_)));
        let settled = form.settle(Err(ApiError::Status {
            status: 422,
            message: Some("Title already taken".to_string()),
        }));
        assert_eq!(settled, Settled::Failure("Title already taken".to_string()));
    }

    #[tokio::test]
    async fn test_edit_load_outcomes() {
        let api = FakeApi::with_travels(vec![travel(3, "Bali Trip")]);
        let cache = QueryCache::new();

        let mut form = FormController::<TravelForm>::new(FormMode::Edit(3));
        form.load(&api, &cache).await;
        assert!(form.is_ready());
        assert_eq!(form.value(fields::TITLE), "Bali Trip");
        assert_eq!(form.value(fields::PRICE), "500000");
        assert_eq!(form.value(fields::RETURN_DATE), "");

        let mut missing = FormController::<TravelForm>::new(FormMode::Edit(99));
        missing.load(&api, &cache).await;
        assert_eq!(missing.phase(), &FormPhase::NotFound);

        api.fail_next(ApiError::Status { status: 503, message: None });
        let mut broken = FormController::<TravelForm>::new(FormMode::Edit(4));
        broken.load(&api, &cache).await;
        assert_eq!(
            broken.phase(),
            &FormPhase::LoadFailed("Failed to load travel. Please try again.".to_string())
        );
        assert!(!broken.set_value(fields::TITLE, "x"));
    }

    #[tokio::test]
    async fn test_list_is_fresh_after_update() {
        let api = FakeApi::with_travels(vec![travel(3, "Bali Trip")]);
        let cache = QueryCache::new();
        let list_key = CacheKey::list(EntityKind::Travel);

        let before: Vec<Travel> = cache.get_or_fetch(list_key, || api.list_travels()).await.unwrap();
        assert_eq!(before[0].title, "Bali Trip");

        let mut form = FormController::<TravelForm>::new(FormMode::Edit(3));
        form.load(&api, &cache).await;
        assert!(cache.contains(&CacheKey::entity(EntityKind::Travel, 3)));
        form.set_value(fields::TITLE, "Bali Getaway");
        let outcome = form.submit(&api, &cache).await;
        assert!(matches!(outcome, SubmitOutcome::Settled(Settled::Success(_))));

        assert!(!cache.contains(&list_key));
        assert!(!cache.contains(&CacheKey::entity(EntityKind::Travel, 3)));
        let after: Vec<Travel> = cache.get_or_fetch(list_key, || api.list_travels()).await.unwrap();
        assert_eq!(after[0].title, "Bali Getaway");
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let api = FakeApi::with_travels(vec![travel(3, "Bali Trip")]);
        let cache = QueryCache::new();
        let list_key = CacheKey::list(EntityKind::Travel);
        let _: Vec<Travel> = cache.get_or_fetch(list_key, || api.list_travels()).await.unwrap();

        let mut form = ready_form(FormMode::Create, bali_trip());
        api.fail_next(ApiError::Status { status: 500, message: None });
        let outcome = form.submit(&api, &cache).await;

        assert!(matches!(outcome, SubmitOutcome::Settled(Settled::Failure(_))));
        assert!(cache.contains(&list_key));
    }
}
