use std::collections::HashMap;
use std::rc::Rc;

use crate::contracts::{ChangeNotify, Widget, WidgetKind};
use crate::id::WidgetId;
use crate::signal::Subscription;
use crate::widgets::{
    Checkbox, DatePicker, LabeledInput, MultiSelect, NumberInput, PasswordInput, Progress, Radio,
    RadioGroup, Rating, Select, Slider, Switch, TextInput, Textarea, TimePicker, ToggleButton,
};

use super::controller::{FormCoordinator, FormResult, write_state};

/// Connects a widget's native change signal to `notify`.
pub type ChangeWiring = Rc<dyn Fn(&dyn Widget, ChangeNotify) -> Option<Subscription>>;

/// Bridges kind-specific change signals to one "value changed" callback.
///
/// At most one subscription is held per widget.
pub struct ChangeNotificationHub {
    wiring: HashMap<WidgetKind, ChangeWiring>,
    subscriptions: HashMap<WidgetId, Subscription>,
}

impl ChangeNotificationHub {
    pub fn new() -> Self {
        let mut hub = Self::empty();
        hub.register_standard();
        hub
    }

    pub fn empty() -> Self {
        Self {
            wiring: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        kind: WidgetKind,
        wiring: impl Fn(&dyn Widget, ChangeNotify) -> Option<Subscription> + 'static,
    ) {
        self.wiring.insert(kind, Rc::new(wiring));
    }

    pub fn register_for<W: Widget>(
        &mut self,
        wiring: impl Fn(&W, ChangeNotify) -> Subscription + 'static,
    ) {
        self.register(WidgetKind::of::<W>(), move |widget: &dyn Widget, notify| {
            widget
                .as_any()
                .downcast_ref::<W>()
                .map(|widget| wiring(widget, notify))
        });
    }

    pub fn unregister(&mut self, kind: WidgetKind) -> bool {
        self.wiring.remove(&kind).is_some()
    }

    pub fn has_wiring(&self, kind: WidgetKind) -> bool {
        self.wiring.contains_key(&kind)
    }

    /// Subscribes `widget`, replacing any earlier subscription it had.
    ///
    /// Returns `false` when the widget neither watches itself nor has a wiring
    /// for its exact kind; it then has no subscription at all.
    pub fn subscribe(&mut self, widget: &dyn Widget, on_changed: ChangeNotify) -> bool {
        let id = widget.id();
        self.unsubscribe(id);

        let subscription = match widget.as_form_part() {
            Some(part) => part.watch(on_changed.clone()),
            None => None,
        }
        .or_else(|| {
            self.wiring
                .get(&widget.kind())
                .and_then(|wiring| wiring(widget, on_changed))
        });

        match subscription {
            Some(subscription) => {
                tracing::trace!(widget = %id, kind = ?widget.kind(), "subscribed to changes");
                self.subscriptions.insert(id, subscription);
                true
            }
            None => {
                tracing::debug!(widget = %id, kind = ?widget.kind(), "no change wiring for kind");
                false
            }
        }
    }

    pub fn unsubscribe(&mut self, widget: WidgetId) -> bool {
        self.subscriptions.remove(&widget).is_some()
    }

    pub fn is_subscribed(&self, widget: WidgetId) -> bool {
        self.subscriptions.contains_key(&widget)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Drops every subscription; wirings stay registered.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    fn register_standard(&mut self) {
        self.register_for::<TextInput>(|widget, notify| {
            let id = widget.id();
            widget.on_text_committed(move |_| notify(id)).into()
        });
        self.register_for::<PasswordInput>(|widget, notify| {
            let id = widget.id();
            widget.on_text_committed(move |_| notify(id)).into()
        });
        self.register_for::<Textarea>(|widget, notify| {
            let id = widget.id();
            widget.on_text_committed(move |_| notify(id)).into()
        });

        self.register_for::<Checkbox>(|widget, notify| {
            let id = widget.id();
            widget.on_checked_change(move |_| notify(id)).into()
        });
        self.register_for::<Switch>(|widget, notify| {
            let id = widget.id();
            widget.on_checked_change(move |_| notify(id)).into()
        });
        self.register_for::<Radio>(|widget, notify| {
            let id = widget.id();
            widget.on_checked_change(move |_| notify(id)).into()
        });
        self.register_for::<ToggleButton>(|widget, notify| {
            let id = widget.id();
            widget.on_checked_change(move |_| notify(id)).into()
        });

        self.register_for::<RadioGroup>(|widget, notify| {
            let id = widget.id();
            widget.on_checked_change(move |_| notify(id)).into()
        });
        self.register_for::<Select>(|widget, notify| {
            let id = widget.id();
            widget.on_selection_change(move |_| notify(id)).into()
        });
        self.register_for::<MultiSelect>(|widget, notify| {
            let id = widget.id();
            widget.on_selection_change(move |_| notify(id)).into()
        });

        self.register_for::<Slider>(|widget, notify| {
            let id = widget.id();
            widget.on_release(move |_| notify(id)).into()
        });
        self.register_for::<Progress>(|widget, notify| {
            let id = widget.id();
            widget.on_value_change(move |_| notify(id)).into()
        });
        self.register_for::<NumberInput>(|widget, notify| {
            let id = widget.id();
            widget.on_value_change(move |_| notify(id)).into()
        });
        self.register_for::<Rating>(|widget, notify| {
            let id = widget.id();
            widget.on_rating_change(move |_| notify(id)).into()
        });

        self.register_for::<DatePicker>(|widget, notify| {
            let id = widget.id();
            widget.on_date_change(move |_| notify(id)).into()
        });
        self.register_for::<TimePicker>(|widget, notify| {
            let id = widget.id();
            widget.on_time_change(move |_| notify(id)).into()
        });

        // Reported for the wrapper, not the inner input.
        self.register_for::<LabeledInput>(|widget, notify| {
            let id = widget.id();
            widget.input().on_text_committed(move |_| notify(id)).into()
        });
    }
}

impl Default for ChangeNotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl FormCoordinator {
    /// Teaches this form how to watch widgets of kind `W`. Widgets subscribed
    /// earlier keep their current subscription.
    pub fn add_change_wiring_for<W: Widget>(
        &self,
        wiring: impl Fn(&W, ChangeNotify) -> Subscription + 'static,
    ) -> FormResult<()> {
        write_state(&self.inner.state, "registering change wiring")?
            .hub
            .register_for(wiring);
        tracing::debug!(form = %self.inner.id, kind = ?WidgetKind::of::<W>(), "registered change wiring");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{FormPart, WidgetBase};
    use crate::signal::Signal;
    use calmform_derive::Widget;
    use std::cell::RefCell;

    fn recorder() -> (ChangeNotify, Rc<RefCell<Vec<WidgetId>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let notify: ChangeNotify = Rc::new(move |id: WidgetId| sink.borrow_mut().push(id));
        (notify, seen)
    }

    #[derive(Widget)]
    struct Knob {
        base: WidgetBase,
    }

    #[derive(Widget)]
    #[widget(form_part)]
    struct Counter {
        base: WidgetBase,
        bumped: Signal<()>,
    }

    impl FormPart for Counter {
        fn to_value(&self) -> String {
            String::new()
        }

        fn watch(&self, notify: ChangeNotify) -> Option<Subscription> {
            let id = self.base.id();
            Some(self.bumped.connect(move |_| notify(id)).into())
        }
    }

    #[test]
    fn text_change_notifies_once_per_settled_edit() {
        let mut hub = ChangeNotificationHub::new();
        let input = TextInput::new();
        let (notify, seen) = recorder();
        assert!(hub.subscribe(&input, notify));

        input.edit(|text| text.push_str("Jumpei"));
        input.set_text("Jumpei");
        assert_eq!(*seen.borrow(), vec![input.id()]);
    }

    #[test]
    fn slider_notifies_on_release_only() {
        let mut hub = ChangeNotificationHub::new();
        let slider = Slider::new();
        let (notify, seen) = recorder();
        hub.subscribe(&slider, notify);

        slider.drag_to(10.0);
        slider.drag_to(20.0);
        assert!(seen.borrow().is_empty());
        slider.end_drag();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn labeled_input_reports_the_wrapper() {
        let mut hub = ChangeNotificationHub::new();
        let labeled = LabeledInput::new("Name");
        let (notify, seen) = recorder();
        hub.subscribe(&labeled, notify);

        labeled.input().set_text("x");
        assert_eq!(*seen.borrow(), vec![labeled.id()]);
    }

    #[test]
    fn resubscribing_keeps_a_single_subscription() {
        let mut hub = ChangeNotificationHub::new();
        let checkbox = Checkbox::new("agree");
        let (notify, seen) = recorder();
        hub.subscribe(&checkbox, notify.clone());
        hub.subscribe(&checkbox, notify);
        assert_eq!(hub.len(), 1);

        checkbox.toggle();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn unsubscribe_disconnects_the_native_signal() {
        let mut hub = ChangeNotificationHub::new();
        let rating = Rating::new();
        let (notify, seen) = recorder();
        hub.subscribe(&rating, notify);

        assert!(hub.unsubscribe(rating.id()));
        assert!(!hub.unsubscribe(rating.id()));
        rating.set_value(4.0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unknown_kinds_are_not_subscribed() {
        let mut hub = ChangeNotificationHub::new();
        let knob = Knob {
            base: WidgetBase::new(),
        };
        let (notify, _) = recorder();
        assert!(!hub.subscribe(&knob, notify));
        assert!(!hub.is_subscribed(knob.id()));
    }

    #[test]
    fn self_watching_widgets_bypass_the_wiring_table() {
        let mut hub = ChangeNotificationHub::empty();
        let counter = Counter {
            base: WidgetBase::new(),
            bumped: Signal::new(),
        };
        let (notify, seen) = recorder();
        assert!(hub.subscribe(&counter, notify));

        counter.bumped.emit(&());
        assert_eq!(*seen.borrow(), vec![counter.id()]);
    }
}
