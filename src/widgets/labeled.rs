use std::cell::RefCell;
use std::rc::Rc;

use calmform_derive::Widget;

use crate::contracts::WidgetBase;

use super::TextInput;

/// Label, inner text input and an error line, bound into a form as one widget.
#[derive(Widget)]
pub struct LabeledInput {
    base: WidgetBase,
    label: String,
    input: Rc<TextInput>,
    error: RefCell<Option<String>>,
}

impl LabeledInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_input(label, Rc::new(TextInput::new()))
    }

    pub fn with_input(label: impl Into<String>, input: Rc<TextInput>) -> Self {
        Self {
            base: WidgetBase::new(),
            label: label.into(),
            input,
            error: RefCell::new(None),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &Rc<TextInput> {
        &self.input
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn set_error(&self, error: Option<String>) {
        *self.error.borrow_mut() = error;
    }
}
