use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use calmform_derive::Widget;

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RadioOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl RadioOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, value: bool) -> Self {
        self.disabled = value;
        self
    }
}

/// Single choice among radio options, identified by option value.
#[derive(Widget)]
pub struct RadioGroup {
    base: WidgetBase,
    options: Vec<RadioOption>,
    checked: RefCell<Option<String>>,
    changed: Signal<Option<String>>,
}

impl RadioGroup {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            options: Vec::new(),
            checked: RefCell::new(None),
            changed: Signal::new(),
        }
    }

    pub fn option(mut self, option: RadioOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(&self) -> &[RadioOption] {
        &self.options
    }

    pub fn checked_value(&self) -> Option<String> {
        self.checked.borrow().clone()
    }

    /// Returns `false` for unknown or disabled options.
    pub fn check(&self, value: &str) -> bool {
        let selectable = self
            .options
            .iter()
            .any(|option| option.value == value && !option.disabled);
        if !selectable {
            return false;
        }
        self.replace_checked(Some(value.to_string()));
        true
    }

    pub fn clear_check(&self) {
        self.replace_checked(None);
    }

    pub fn on_checked_change(&self, handler: impl Fn(&Option<String>) + 'static) -> Connection {
        self.changed.connect(handler)
    }

    fn replace_checked(&self, next: Option<String>) {
        let previous = self.checked.replace(next.clone());
        if previous != next {
            self.changed.emit(&next);
        }
    }
}

impl Default for RadioGroup {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: Option<String>,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            disabled: false,
        }
    }

    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(value.into());
        self
    }

    pub fn disabled(mut self, value: bool) -> Self {
        self.disabled = value;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

fn selectable(options: &[SelectOption], index: usize) -> bool {
    options.get(index).is_some_and(|option| !option.disabled)
}

/// Dropdown with a single selected position.
#[derive(Widget)]
pub struct Select {
    base: WidgetBase,
    options: Vec<SelectOption>,
    selected: Cell<Option<usize>>,
    changed: Signal<Option<usize>>,
}

impl Select {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            options: Vec::new(),
            selected: Cell::new(None),
            changed: Signal::new(),
        }
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.selected.get().and_then(|index| self.options.get(index))
    }

    pub fn select(&self, index: usize) -> bool {
        if !selectable(&self.options, index) {
            return false;
        }
        self.replace_selected(Some(index));
        true
    }

    pub fn select_value(&self, value: &str) -> bool {
        self.options
            .iter()
            .position(|option| option.value == value)
            .is_some_and(|index| self.select(index))
    }

    pub fn clear_selection(&self) {
        self.replace_selected(None);
    }

    pub fn on_selection_change(&self, handler: impl Fn(&Option<usize>) + 'static) -> Connection {
        self.changed.connect(handler)
    }

    fn replace_selected(&self, next: Option<usize>) {
        if self.selected.replace(next) != next {
            self.changed.emit(&next);
        }
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Widget)]
pub struct MultiSelect {
    base: WidgetBase,
    options: Vec<SelectOption>,
    selected: RefCell<BTreeSet<usize>>,
    changed: Signal<Vec<usize>>,
}

impl MultiSelect {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            options: Vec::new(),
            selected: RefCell::new(BTreeSet::new()),
            changed: Signal::new(),
        }
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Selected positions, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.borrow().iter().copied().collect()
    }

    pub fn toggle_index(&self, index: usize) -> bool {
        if !selectable(&self.options, index) {
            return false;
        }
        {
            let mut selected = self.selected.borrow_mut();
            if !selected.remove(&index) {
                selected.insert(index);
            }
        }
        self.changed.emit(&self.selected_indices());
        true
    }

    /// Replaces the selection; unselectable positions are ignored.
    pub fn set_selected(&self, indices: impl IntoIterator<Item = usize>) {
        let next = indices
            .into_iter()
            .filter(|index| selectable(&self.options, *index))
            .collect::<BTreeSet<_>>();
        let previous = self.selected.replace(next.clone());
        if previous != next {
            self.changed.emit(&self.selected_indices());
        }
    }

    pub fn on_selection_change(&self, handler: impl Fn(&Vec<usize>) + 'static) -> Connection {
        self.changed.connect(handler)
    }
}

impl Default for MultiSelect {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn radio_group_rejects_unknown_and_disabled_options() {
        let group = RadioGroup::new()
            .option(RadioOption::new("s", "Small"))
            .option(RadioOption::new("l", "Large").disabled(true));
        let changes = Rc::new(Cell::new(0));
        let sink = changes.clone();
        let _ = group.on_checked_change(move |_| sink.set(sink.get() + 1));

        assert!(!group.check("xl"));
        assert!(!group.check("l"));
        assert!(group.check("s"));
        assert!(group.check("s"));
        assert_eq!(group.checked_value().as_deref(), Some("s"));
        assert_eq!(changes.get(), 1);

        group.clear_check();
        assert_eq!(group.checked_value(), None);
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn select_by_value_maps_to_position() {
        let select = Select::new()
            .option(SelectOption::new("jp").label("Japan"))
            .option(SelectOption::new("fr"));
        assert!(select.select_value("fr"));
        assert_eq!(select.selected_index(), Some(1));
        assert_eq!(select.selected_option().map(SelectOption::display_label), Some("fr"));
        assert!(!select.select(5));
    }

    #[test]
    fn multiselect_keeps_sorted_positions() {
        let multi = MultiSelect::new()
            .option(SelectOption::new("a"))
            .option(SelectOption::new("b"))
            .option(SelectOption::new("c").disabled(true));
        multi.set_selected([1, 0, 2]);
        assert_eq!(multi.selected_indices(), vec![0, 1]);
        assert!(multi.toggle_index(0));
        assert_eq!(multi.selected_indices(), vec![1]);
    }
}
