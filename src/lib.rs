pub mod form;
pub mod id;
pub mod prelude;

pub use crate::form::{
    FieldController, FieldOptions, FormContext, FormController, FormError, FormOptions,
    FormResult, FormValues, SubmitOutcome, SubscriptionRegistry, ValidationRule,
};
pub use crate::id::{ChannelKey, FormId, SubscriberHandle};
