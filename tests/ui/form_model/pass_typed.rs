use calmform::form::{FormError, FormModel, FormValues};

#[derive(Debug, calmform::form::FormModel)]
struct Signup {
    r#type: String,
    nickname: Option<String>,
    age: u32,
    newsletter: bool,
}

fn main() {
    assert_eq!(Signup::fields().r#type(), "type");

    let values: FormValues = [("type", "admin"), ("age", "41"), ("newsletter", "on")]
        .into_iter()
        .collect();
    let signup = values.parse::<Signup>().expect("parse signup");
    assert_eq!(signup.r#type, "admin");
    assert_eq!(signup.nickname, None);
    assert_eq!(signup.age, 41);
    assert!(signup.newsletter);

    let broken: FormValues = [("age", "forty")].into_iter().collect();
    match Signup::from_values(&broken) {
        Err(FormError::InvalidFieldValue { field, value, .. }) => {
            assert_eq!(field, "age");
            assert_eq!(value, "forty");
        }
        other => panic!("unexpected parse result: {other:?}"),
    }
}
