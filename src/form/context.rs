use std::sync::{Arc, RwLock};

use super::controller::{FormState, FormValues, PropagatedFailureHandler, read_lock, write_lock};
use super::registry::{ChannelClaim, Subscription, SubscriptionRegistry};
use crate::id::FormId;

/// What a form hands down to the fields mounted beneath it.
///
/// Cloning is cheap. Reads always observe the form's latest values. A live
/// context keeps the form id reserved on its registry.
#[derive(Clone)]
pub struct FormContext {
    form_id: FormId,
    registry: SubscriptionRegistry,
    state: Arc<RwLock<FormState>>,
    on_propagated_failed_submit: Option<PropagatedFailureHandler>,
    _claim: Arc<ChannelClaim>,
}

impl FormContext {
    pub(super) fn new(
        form_id: FormId,
        registry: SubscriptionRegistry,
        state: Arc<RwLock<FormState>>,
        on_propagated_failed_submit: Option<PropagatedFailureHandler>,
        claim: Arc<ChannelClaim>,
    ) -> Self {
        Self {
            form_id,
            registry,
            state,
            on_propagated_failed_submit,
            _claim: claim,
        }
    }

    pub fn form_id(&self) -> &FormId {
        &self.form_id
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn values(&self) -> FormValues {
        read_lock(&self.state).values.clone()
    }

    pub fn value(&self, name: &str) -> Option<String> {
        read_lock(&self.state).values.get(name).map(str::to_owned)
    }

    pub fn submission_attempts(&self) -> u32 {
        read_lock(&self.state).submission_attempts
    }

    pub fn on_change(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        {
            let mut state = write_lock(&self.state);
            state.values.insert(name.clone(), value);
        }
        tracing::trace!(form = %self.form_id, field = %name, "field value changed");
        self.registry.emit(self.form_id.change_channel());
    }

    /// Calls `on_update` after every value change and every rejected submit.
    pub fn observe(&self, on_update: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.registry.bind(self.form_id.change_channel(), move || {
            on_update();
            true
        })
    }

    pub(super) fn state(&self) -> Arc<RwLock<FormState>> {
        self.state.clone()
    }

    pub(super) fn propagated_failure_handler(&self) -> Option<PropagatedFailureHandler> {
        self.on_propagated_failed_submit.clone()
    }
}

impl std::fmt::Debug for FormContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormContext")
            .field("form_id", &self.form_id)
            .field("values", &self.values())
            .finish_non_exhaustive()
    }
}
