use super::context::FormContext;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeEvent {
    pub value: String,
}

impl ChangeEvent {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<&str> for ChangeEvent {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChangeEvent {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Host submit event. The form always prevents its default action.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Writes one field's value back into its form.
#[derive(Clone, Debug)]
pub struct FieldChange {
    context: FormContext,
    name: String,
}

impl FieldChange {
    pub(super) fn new(context: FormContext, name: String) -> Self {
        Self { context, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emit(&self, event: impl Into<ChangeEvent>) {
        let event = event.into();
        self.context.on_change(self.name.clone(), event.value);
    }
}

/// Everything a field's render function receives.
#[derive(Clone, Debug)]
pub struct FieldRender {
    pub value: String,
    pub current_errors: Vec<String>,
    pub on_change: FieldChange,
}
