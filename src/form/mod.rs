mod binding;
mod context;
mod controller;
mod field;
mod registry;
mod validation;


pub use calmform_derive::FormModel;
pub use binding::{ChangeEvent, FieldChange, FieldRender, SubmitEvent};
pub use context::FormContext;
pub use controller::{
    FormController, FormError, FormOptions, FormResult, FormValues, SubmitOutcome,
};
pub use field::{FieldController, FieldOptions};
pub use registry::{ChannelClaim, Subscription, SubscriptionRegistry};
pub use validation::{FieldValue, FormModel, ValidationRule};
