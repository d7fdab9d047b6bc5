use std::rc::Rc;

use calmform::contracts::{FormPart, WidgetBase};
use calmform::form::{FormCoordinator, FormOptions};

#[derive(calmform::Widget)]
#[widget(form_part)]
struct Signature {
    base: WidgetBase,
    strokes: usize,
}

impl FormPart for Signature {
    fn to_value(&self) -> String {
        format!("{} strokes", self.strokes)
    }
}

fn main() {
    let form = FormCoordinator::new(FormOptions::default());
    form.add(
        "signature",
        Rc::new(Signature {
            base: WidgetBase::new(),
            strokes: 2,
        }),
    )
    .expect("bind signature");
    let params = form.get_params().expect("params");
    assert_eq!(params["signature"], "2 strokes");
}
