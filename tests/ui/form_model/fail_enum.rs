use calmform::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
enum ChoiceForm {
    Email(String),
    Phone(String),
}

fn main() {}
