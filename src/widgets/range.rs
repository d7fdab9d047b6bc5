use std::cell::Cell;

use calmform_derive::Widget;
use rust_decimal::Decimal;

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

/// Draggable value on a continuous track.
///
/// `on_move` fires for every intermediate drag position; `on_release` fires
/// once when a drag ends on a new value, or for a programmatic `set_value`.
#[derive(Widget)]
pub struct Slider {
    base: WidgetBase,
    min: f64,
    max: f64,
    value: Cell<f64>,
    drag_origin: Cell<Option<f64>>,
    moved: Signal<f64>,
    released: Signal<f64>,
}

impl Slider {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            min: 0.0,
            max: 100.0,
            value: Cell::new(0.0),
            drag_origin: Cell::new(None),
            moved: Signal::new(),
            released: Signal::new(),
        }
    }

    /// A NaN bound keeps the current one.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        let min = if min.is_nan() { self.min } else { min };
        let max = if max.is_nan() { self.max } else { max };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = min;
        self.max = max;
        let clamped = self.clamp(self.value.get());
        self.value.set(clamped);
        self
    }

    pub fn with_value(self, value: f64) -> Self {
        self.value.set(self.clamp(value));
        self
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.get().is_some()
    }

    pub fn set_value(&self, value: f64) {
        let next = self.clamp(value);
        let previous = self.value.replace(next);
        if self.is_dragging() {
            self.moved.emit(&next);
        } else if previous != next {
            self.released.emit(&next);
        }
    }

    pub fn begin_drag(&self) {
        if !self.is_dragging() {
            self.drag_origin.set(Some(self.value.get()));
        }
    }

    pub fn drag_to(&self, value: f64) {
        self.begin_drag();
        let next = self.clamp(value);
        if self.value.replace(next) != next {
            self.moved.emit(&next);
        }
    }

    pub fn end_drag(&self) {
        let Some(origin) = self.drag_origin.take() else {
            return;
        };
        let value = self.value.get();
        if origin != value {
            self.released.emit(&value);
        }
    }

    pub fn on_move(&self, handler: impl Fn(&f64) + 'static) -> Connection {
        self.moved.connect(handler)
    }

    pub fn on_release(&self, handler: impl Fn(&f64) + 'static) -> Connection {
        self.released.connect(handler)
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

impl Default for Slider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Widget)]
pub struct Progress {
    base: WidgetBase,
    max: f64,
    value: Cell<f64>,
    changed: Signal<f64>,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            max: 100.0,
            value: Cell::new(0.0),
            changed: Signal::new(),
        }
    }

    pub fn max(mut self, value: f64) -> Self {
        self.max = value.max(0.0);
        self
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn fraction(&self) -> f64 {
        if self.max == 0.0 {
            return 0.0;
        }
        self.value.get() / self.max
    }

    pub fn set_value(&self, value: f64) {
        let next = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.max)
        };
        if self.value.replace(next) != next {
            self.changed.emit(&next);
        }
    }

    pub fn on_value_change(&self, handler: impl Fn(&f64) + 'static) -> Connection {
        self.changed.connect(handler)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Stepper over exact decimal values.
#[derive(Widget)]
pub struct NumberInput {
    base: WidgetBase,
    min: Option<Decimal>,
    max: Option<Decimal>,
    step: Decimal,
    value: Cell<Decimal>,
    changed: Signal<Decimal>,
}

impl NumberInput {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            min: None,
            max: None,
            step: Decimal::ONE,
            value: Cell::new(Decimal::ZERO),
            changed: Signal::new(),
        }
    }

    pub fn min(mut self, value: Decimal) -> Self {
        self.min = Some(value);
        self
    }

    pub fn max(mut self, value: Decimal) -> Self {
        self.max = Some(value);
        self
    }

    pub fn step(mut self, value: Decimal) -> Self {
        self.step = value.abs();
        self
    }

    pub fn with_value(self, value: Decimal) -> Self {
        self.value.set(self.clamp(value));
        self
    }

    pub fn value(&self) -> Decimal {
        self.value.get()
    }

    pub fn set_value(&self, value: Decimal) {
        let next = self.clamp(value);
        if self.value.replace(next) != next {
            self.changed.emit(&next);
        }
    }

    pub fn increment(&self) {
        self.set_value(self.value.get().saturating_add(self.step));
    }

    pub fn decrement(&self) {
        self.set_value(self.value.get().saturating_sub(self.step));
    }

    pub fn on_value_change(&self, handler: impl Fn(&Decimal) + 'static) -> Connection {
        self.changed.connect(handler)
    }

    fn clamp(&self, value: Decimal) -> Decimal {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

impl Default for NumberInput {
    fn default() -> Self {
        Self::new()
    }
}
