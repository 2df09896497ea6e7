use calmform::form::{FormModel, FormValues};

#[derive(Clone, calmform::form::FormModel)]
struct DemoForm {
    email: String,
}

fn main() {
    let fields = DemoForm::fields();
    assert_eq!(fields.email(), "email");
    assert_eq!(DemoForm::FIELD_NAMES, &["email"]);

    let values: FormValues = [("email", "b@calm.ui")].into_iter().collect();
    let model = DemoForm::from_values(&values).expect("parse demo form");
    assert_eq!(model.email, "b@calm.ui");
    assert_eq!(model.to_values(), values);
}
