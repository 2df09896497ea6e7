use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::binding::SubmitEvent;
use super::context::FormContext;
use super::registry::{ChannelClaim, SubscriptionRegistry};
use super::validation::FormModel;
use crate::id::FormId;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value for `name`, or the empty string when the field was never set.
    pub fn value_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn parse<T: FormModel>(&self) -> FormResult<T> {
        T::from_values(self)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    /// Skip field validation and hand the values to `on_submit` every time.
    pub always_submit: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Submitted(FormValues),
    Rejected { submission_attempts: u32 },
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    EmptyFormId,
    DuplicateFormId(String),
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::EmptyFormId => f.write_str("form id must not be empty"),
            FormError::DuplicateFormId(channel) => {
                write!(f, "another mounted form already owns channel {channel}")
            }
            FormError::InvalidFieldValue {
                field,
                value,
                reason,
            } => write!(f, "invalid value {value:?} for field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type SubmitHandler = Arc<dyn Fn(&FormValues) + Send + Sync>;
pub(super) type FailedSubmitHandler = Arc<dyn Fn() + Send + Sync>;
pub(super) type PropagatedFailureHandler = Arc<dyn Fn(&str, &[String]) + Send + Sync>;

#[derive(Default)]
pub(super) struct FormState {
    pub(super) values: FormValues,
    pub(super) submission_attempts: u32,
}

/// Owns a form's values and decides, once per submit, whether they go out.
#[derive(Clone)]
pub struct FormController {
    id: FormId,
    options: FormOptions,
    registry: SubscriptionRegistry,
    state: Arc<RwLock<FormState>>,
    on_submit: SubmitHandler,
    on_failed_submit: Option<FailedSubmitHandler>,
    on_propagated_failed_submit: Option<PropagatedFailureHandler>,
    _claim: Arc<ChannelClaim>,
}

impl FormController {
    pub fn new(
        registry: &SubscriptionRegistry,
        id: impl Into<FormId>,
        on_submit: impl Fn(&FormValues) + Send + Sync + 'static,
    ) -> FormResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(FormError::EmptyFormId);
        }
        let claim = registry.claim(id.submission_channel())?;
        tracing::debug!(form = %id, "form mounted");
        Ok(Self {
            id,
            options: FormOptions::default(),
            registry: registry.clone(),
            state: Arc::new(RwLock::new(FormState::default())),
            on_submit: Arc::new(on_submit),
            on_failed_submit: None,
            on_propagated_failed_submit: None,
            _claim: Arc::new(claim),
        })
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn always_submit(mut self, always_submit: bool) -> Self {
        self.options.always_submit = always_submit;
        self
    }

    pub fn on_failed_submit(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_failed_submit = Some(Arc::new(handler));
        self
    }

    pub fn on_propagated_failed_submit(
        mut self,
        handler: impl Fn(&str, &[String]) + Send + Sync + 'static,
    ) -> Self {
        self.on_propagated_failed_submit = Some(Arc::new(handler));
        self
    }

    pub fn id(&self) -> &FormId {
        &self.id
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn context(&self) -> FormContext {
        FormContext::new(
            self.id.clone(),
            self.registry.clone(),
            self.state.clone(),
            self.on_propagated_failed_submit.clone(),
            self._claim.clone(),
        )
    }

    pub fn values(&self) -> FormValues {
        read_lock(&self.state).values.clone()
    }

    pub fn submission_attempts(&self) -> u32 {
        read_lock(&self.state).submission_attempts
    }

    pub fn on_change(&self, name: impl Into<String>, value: impl Into<String>) {
        self.context().on_change(name, value);
    }

    /// Renders the form's children with the current submission attempt count.
    pub fn render<R>(&self, children: impl FnOnce(u32) -> R) -> R {
        children(self.submission_attempts())
    }

    pub fn handle_submit(&self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();
        self.submit()
    }

    pub fn submit(&self) -> SubmitOutcome {
        if self.options.always_submit {
            let values = self.values();
            (self.on_submit)(&values);
            return SubmitOutcome::Submitted(values);
        }

        let valid = self.registry.emit(self.id.submission_channel());
        if valid {
            let values = self.values();
            tracing::debug!(form = %self.id, fields = values.len(), "form submitted");
            (self.on_submit)(&values);
            return SubmitOutcome::Submitted(values);
        }

        let submission_attempts = {
            let mut state = write_lock(&self.state);
            state.submission_attempts = state.submission_attempts.saturating_add(1);
            state.submission_attempts
        };
        tracing::debug!(form = %self.id, submission_attempts, "form submission rejected");
        if let Some(handler) = &self.on_failed_submit {
            handler();
        }
        self.registry.emit(self.id.change_channel());
        SubmitOutcome::Rejected {
            submission_attempts,
        }
    }

    pub fn submit_as<T: FormModel>(&self) -> FormResult<Option<T>> {
        match self.submit() {
            SubmitOutcome::Submitted(values) => values.parse().map(Some),
            SubmitOutcome::Rejected { .. } => Ok(None),
        }
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("submission_attempts", &self.submission_attempts())
            .finish_non_exhaustive()
    }
}

pub(super) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(super) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
