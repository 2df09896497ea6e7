use std::sync::{Arc, RwLock};

use super::binding::{FieldChange, FieldRender};
use super::context::FormContext;
use super::controller::{FormState, PropagatedFailureHandler, read_lock};
use super::registry::Subscription;
use super::validation::{ValidationRule, collect_errors};

pub(super) type FieldFailureHandler = Arc<dyn Fn(&[String]) + Send + Sync>;

#[derive(Clone, Default)]
pub struct FieldOptions {
    rules: Vec<ValidationRule>,
    default_value: Option<String>,
    on_failed_submit: Option<FieldFailureHandler>,
    on_propagated_failed_submit: Option<PropagatedFailureHandler>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = ValidationRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn on_failed_submit(mut self, handler: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.on_failed_submit = Some(Arc::new(handler));
        self
    }

    /// Overrides the form's propagated failure handler for this field only.
    pub fn on_propagated_failed_submit(
        mut self,
        handler: impl Fn(&str, &[String]) + Send + Sync + 'static,
    ) -> Self {
        self.on_propagated_failed_submit = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOptions")
            .field("rules", &self.rules)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

struct FieldValidator {
    name: String,
    rules: Vec<ValidationRule>,
    state: Arc<RwLock<FormState>>,
    on_failed_submit: Option<FieldFailureHandler>,
    on_propagated_failed_submit: Option<PropagatedFailureHandler>,
}

impl FieldValidator {
    fn value(&self) -> String {
        read_lock(&self.state)
            .values
            .value_or_empty(&self.name)
            .to_owned()
    }

    fn current_errors(&self) -> Vec<String> {
        collect_errors(&self.rules, &self.value())
    }

    fn handle_submission_attempt(&self) -> bool {
        let errors = self.current_errors();
        if errors.is_empty() {
            return true;
        }
        tracing::debug!(field = %self.name, errors = errors.len(), "field failed validation");
        if let Some(handler) = &self.on_propagated_failed_submit {
            handler(&self.name, &errors);
        }
        if let Some(handler) = &self.on_failed_submit {
            handler(&errors);
        }
        false
    }
}

/// One mounted field: its rules, its value in the form, and its registration
/// on the form's submission channel. Dropping it unmounts it.
pub struct FieldController {
    context: FormContext,
    validator: Arc<FieldValidator>,
    subscription: Option<Subscription>,
}

impl FieldController {
    pub fn mount(context: &FormContext, name: impl Into<String>, options: FieldOptions) -> Self {
        let name = name.into();
        if name.is_empty() {
            tracing::warn!(form = %context.form_id(), "field mounted without a name");
        }

        let FieldOptions {
            rules,
            default_value,
            on_failed_submit,
            on_propagated_failed_submit,
        } = options;

        if let Some(default_value) = default_value.filter(|value| !value.is_empty()) {
            if context.value(&name).is_none() {
                context.on_change(name.clone(), default_value);
            }
        }

        let validator = Arc::new(FieldValidator {
            name,
            rules,
            state: context.state(),
            on_failed_submit,
            on_propagated_failed_submit: on_propagated_failed_submit
                .or_else(|| context.propagated_failure_handler()),
        });
        let registered = validator.clone();
        let subscription = context
            .registry()
            .bind(context.form_id().submission_channel(), move || {
                registered.handle_submission_attempt()
            });

        Self {
            context: context.clone(),
            validator,
            subscription: Some(subscription),
        }
    }

    pub fn name(&self) -> &str {
        &self.validator.name
    }

    pub fn value(&self) -> String {
        self.validator.value()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn current_errors(&self) -> Vec<String> {
        self.validator.current_errors()
    }

    /// Validates this field for a submit. Returns whether it passed.
    pub fn handle_submission_attempt(&self) -> bool {
        self.validator.handle_submission_attempt()
    }

    pub fn on_change(&self, value: impl Into<String>) {
        self.context.on_change(self.validator.name.clone(), value);
    }

    pub fn render(&self) -> FieldRender {
        FieldRender {
            value: self.value(),
            current_errors: self.current_errors(),
            on_change: FieldChange::new(self.context.clone(), self.validator.name.clone()),
        }
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for FieldController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for FieldController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldController")
            .field("form_id", self.context.form_id())
            .field("name", &self.validator.name)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
