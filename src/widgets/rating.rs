use std::cell::Cell;

use calmform_derive::Widget;

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

#[derive(Widget)]
pub struct Rating {
    base: WidgetBase,
    max: usize,
    allow_half: bool,
    value: Cell<f32>,
    changed: Signal<f32>,
}

impl Rating {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            max: 5,
            allow_half: true,
            value: Cell::new(0.0),
            changed: Signal::new(),
        }
    }

    pub fn max(mut self, value: usize) -> Self {
        self.max = value.max(1);
        self
    }

    pub fn allow_half(mut self, value: bool) -> Self {
        self.allow_half = value;
        self
    }

    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn set_value(&self, value: f32) {
        let next = self.snap(value);
        if self.value.replace(next) != next {
            self.changed.emit(&next);
        }
    }

    pub fn clear(&self) {
        self.set_value(0.0);
    }

    pub fn on_rating_change(&self, handler: impl Fn(&f32) + 'static) -> Connection {
        self.changed.connect(handler)
    }

    fn snap(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        let clamped = value.clamp(0.0, self.max as f32);
        if self.allow_half {
            (clamped * 2.0).round() / 2.0
        } else {
            clamped.round()
        }
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::new()
    }
}
