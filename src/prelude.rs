pub use crate::form::{
    ChangeEvent, FieldChange, FieldController, FieldOptions, FieldRender, FieldValue,
    FormContext, FormController, FormError, FormModel, FormOptions, FormResult, FormValues,
    SubmitEvent, SubmitOutcome, Subscription, SubscriptionRegistry, ValidationRule,
};
pub use crate::id::{ChannelKey, FormId};
