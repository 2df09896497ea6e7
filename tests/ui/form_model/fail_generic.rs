use calmform::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
struct GenericForm<T> {
    value: T,
}

fn main() {}
