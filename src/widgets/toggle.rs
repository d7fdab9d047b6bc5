use std::cell::Cell;

use calmform_derive::Widget;

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

pub(crate) struct CheckState {
    checked: Cell<bool>,
    changed: Signal<bool>,
}

impl CheckState {
    fn new() -> Self {
        Self {
            checked: Cell::new(false),
            changed: Signal::new(),
        }
    }

    pub(crate) fn is_checked(&self) -> bool {
        self.checked.get()
    }

    fn set_checked(&self, value: bool) {
        if self.checked.replace(value) != value {
            self.changed.emit(&value);
        }
    }
}

macro_rules! toggle_widget {
    ($type:ident) => {
        #[derive(Widget)]
        pub struct $type {
            base: WidgetBase,
            label: String,
            state: CheckState,
        }

        impl $type {
            pub fn new(label: impl Into<String>) -> Self {
                Self {
                    base: WidgetBase::new(),
                    label: label.into(),
                    state: CheckState::new(),
                }
            }

            pub fn checked(self, value: bool) -> Self {
                self.state.checked.set(value);
                self
            }

            pub fn label(&self) -> &str {
                &self.label
            }

            pub fn is_checked(&self) -> bool {
                self.state.is_checked()
            }

            pub fn set_checked(&self, value: bool) {
                self.state.set_checked(value);
            }

            pub fn toggle(&self) {
                self.state.set_checked(!self.state.is_checked());
            }

            pub fn on_checked_change(&self, handler: impl Fn(&bool) + 'static) -> Connection {
                self.state.changed.connect(handler)
            }
        }
    };
}

toggle_widget!(Checkbox);
toggle_widget!(Switch);
toggle_widget!(Radio);
toggle_widget!(ToggleButton);
