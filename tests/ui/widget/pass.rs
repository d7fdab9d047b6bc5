use std::rc::Rc;

use calmform::contracts::{Widget, WidgetBase, WidgetKind};
use calmform::form::{FormCoordinator, FormOptions};

#[derive(calmform::Widget)]
struct Knob {
    #[widget(base)]
    core: WidgetBase,
    turns: u32,
}

fn main() {
    let knob = Rc::new(Knob {
        core: WidgetBase::new(),
        turns: 3,
    });
    assert_eq!(knob.kind(), WidgetKind::of::<Knob>());
    assert!(knob.as_form_part().is_none());

    let form = FormCoordinator::new(FormOptions::default());
    form.add_converter_for::<Knob>(|knob| knob.turns.to_string())
        .expect("register converter");
    form.add("knob", knob.clone()).expect("bind knob");
    assert_eq!(form.get_value("knob").expect("value").as_deref(), Some("3"));
    assert!(knob.parent().is_some());
}
