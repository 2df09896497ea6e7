use calmform::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
struct TupleForm(String);

fn main() {}
