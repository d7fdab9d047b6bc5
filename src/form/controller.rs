use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::contracts::{Container, LayoutParams, Widget, WidgetHandle};
use crate::id::{FormId, WidgetId};
use crate::widgets::Stack;

use super::converter::ConverterRegistry;
use super::index::KeyWidgetIndex;
use super::notify::ChangeNotificationHub;
use super::validation::{FieldValidator, Validator, ValidatorRegistry};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    DuplicateKey(String),
    DuplicateWidget { key: String, bound_to: String },
    Reentrant(&'static str),
}

impl FormError {
    pub fn is_duplicate_binding(&self) -> bool {
        matches!(
            self,
            FormError::DuplicateKey(_) | FormError::DuplicateWidget { .. }
        )
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::DuplicateKey(key) => write!(f, "key `{key}` is already bound"),
            FormError::DuplicateWidget { key, bound_to } => write!(
                f,
                "cannot bind `{key}`: widget is already bound to `{bound_to}`"
            ),
            FormError::Reentrant(context) => {
                write!(f, "form state is busy while {context}")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

/// What a validator receives when a widget yields no value at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingValue {
    Absent,
    Empty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub missing_value: MissingValue,
    /// Evaluate a validator as soon as it is registered instead of waiting for
    /// the widget's first change.
    pub validate_on_register: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            missing_value: MissingValue::Absent,
            validate_on_register: false,
        }
    }
}

/// Placement and validation for [`FormCoordinator::add_with`].
#[derive(Clone, Default)]
pub struct AddOptions {
    pub(super) position: Option<usize>,
    pub(super) params: Option<LayoutParams>,
    pub(super) validator: Option<Validator>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, value: usize) -> Self {
        self.position = Some(value);
        self
    }

    pub fn params(mut self, value: LayoutParams) -> Self {
        self.params = Some(value);
        self
    }

    pub fn validator(mut self, value: impl FieldValidator + 'static) -> Self {
        self.validator = Some(Rc::new(value));
        self
    }
}

pub(super) struct FormState {
    pub(super) index: KeyWidgetIndex,
    pub(super) converters: ConverterRegistry,
    pub(super) validators: ValidatorRegistry,
    pub(super) hub: ChangeNotificationHub,
}

pub(super) struct InFlight {
    pub(super) key: String,
    pub(super) widget: WidgetId,
}

pub(super) struct FormInner {
    pub(super) id: FormId,
    pub(super) options: FormOptions,
    pub(super) container: Rc<dyn Container>,
    pub(super) state: RefCell<FormState>,
    /// Every evaluation currently running, outermost first.
    pub(super) in_flight: RefCell<Vec<InFlight>>,
}

/// Binds widgets to keys, extracts their values and tracks their validity.
///
/// Cloning yields another handle to the same form. All registries belong to
/// this form; separate coordinators never share state.
///
/// Validators run from widget change signals. While any evaluation runs,
/// including outer ones that triggered it, mutating the binding of a key or
/// widget being evaluated (or clearing the form) fails with
/// [`FormError::Reentrant`].
#[derive(Clone)]
pub struct FormCoordinator {
    pub(super) inner: Rc<FormInner>,
}

impl FormCoordinator {
    pub fn new(options: FormOptions) -> Self {
        Self::with_container(Stack::new(), options)
    }

    pub fn with_container(container: Rc<dyn Container>, options: FormOptions) -> Self {
        Self {
            inner: Rc::new(FormInner {
                id: FormId::next(),
                options,
                container,
                state: RefCell::new(FormState {
                    index: KeyWidgetIndex::new(),
                    converters: ConverterRegistry::new(),
                    validators: ValidatorRegistry::new(),
                    hub: ChangeNotificationHub::new(),
                }),
                in_flight: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn form_id(&self) -> FormId {
        self.inner.id
    }

    pub fn options(&self) -> FormOptions {
        self.inner.options
    }

    pub fn container(&self) -> Rc<dyn Container> {
        self.inner.container.clone()
    }

    pub fn add(&self, key: impl Into<String>, widget: WidgetHandle) -> FormResult<()> {
        self.add_with(key, widget, AddOptions::default())
    }

    /// Binds `widget` to `key` and inserts it into the container.
    ///
    /// A key or widget that is already bound is rejected and nothing changes.
    pub fn add_with(
        &self,
        key: impl Into<String>,
        widget: WidgetHandle,
        options: AddOptions,
    ) -> FormResult<()> {
        let key = key.into();
        self.guard_binding(&key, Some(widget.id()), "adding widget")?;
        let has_validator = options.validator.is_some();
        {
            let mut state = write_state(&self.inner.state, "adding widget")?;
            state.index.put(key.clone(), widget.clone())?;
            if let Some(validator) = options.validator {
                self.install_validator(&mut state, &key, &widget, validator);
            }
        }
        tracing::debug!(form = %self.inner.id, key = %key, widget = %widget.id(), "bound widget");

        self.inner
            .container
            .insert(widget, options.position, options.params);
        if has_validator && self.inner.options.validate_on_register {
            self.evaluate(&key);
        }
        Ok(())
    }

    /// Binds `keys[i]` to `widgets[i]` for every index both slices have.
    ///
    /// The whole batch is checked for conflicts first, so a duplicate anywhere
    /// binds nothing. Widgets that already have a parent are detached from it
    /// before they are added. Returns how many pairs were bound.
    pub fn add_all<K: AsRef<str>>(&self, keys: &[K], widgets: &[WidgetHandle]) -> FormResult<usize> {
        let pairs = keys
            .iter()
            .map(AsRef::<str>::as_ref)
            .zip(widgets.iter())
            .collect::<Vec<_>>();

        {
            let state = read_state(&self.inner.state, "checking batch bindings")?;
            let mut batch_keys = HashSet::new();
            let mut batch_widgets = HashMap::new();
            for (key, widget) in &pairs {
                state.index.check_free(key, widget)?;
                if !batch_keys.insert(*key) {
                    return Err(FormError::DuplicateKey(key.to_string()));
                }
                if let Some(bound_to) = batch_widgets.insert(widget.id(), *key) {
                    return Err(FormError::DuplicateWidget {
                        key: key.to_string(),
                        bound_to: bound_to.to_string(),
                    });
                }
            }
        }

        for (key, widget) in pairs.iter().copied() {
            if let Some(parent) = widget.parent() {
                parent.remove(&**widget);
            }
            self.add(key, widget.clone())?;
        }
        Ok(pairs.len())
    }

    /// [`add_all`](Self::add_all) over the children of `source`, in order.
    pub fn add_all_from<K: AsRef<str>>(&self, keys: &[K], source: &dyn Container) -> FormResult<usize> {
        let children = source.children();
        self.add_all(keys, &children)
    }

    /// Unbinds `key`, dropping its validator and detaching its widget.
    /// Returns `Ok(false)` if the key was not bound.
    pub fn remove(&self, key: &str) -> FormResult<bool> {
        self.guard_binding(key, None, "removing widget")?;
        let widget = {
            let mut state = write_state(&self.inner.state, "removing widget")?;
            let Some(widget) = state.index.remove(key) else {
                return Ok(false);
            };
            state.validators.remove(key);
            state.hub.unsubscribe(widget.id());
            widget
        };
        self.inner.container.remove(widget.as_ref());
        tracing::debug!(form = %self.inner.id, key = %key, widget = %widget.id(), "unbound widget");
        Ok(true)
    }

    pub fn remove_widget(&self, widget: &dyn Widget) -> FormResult<bool> {
        let key = {
            let state = read_state(&self.inner.state, "looking up widget key")?;
            let Some(key) = state.index.key_of(widget.id()) else {
                return Ok(false);
            };
            key.to_string()
        };
        self.remove(&key)
    }

    /// Unbinds everything. Converters and change wirings are kept.
    pub fn remove_all(&self) -> FormResult<()> {
        if !self.inner.in_flight.borrow().is_empty() {
            return Err(FormError::Reentrant("removing all widgets"));
        }
        let widgets = {
            let mut state = write_state(&self.inner.state, "removing all widgets")?;
            let widgets = state
                .index
                .iter()
                .map(|(_, widget)| widget.clone())
                .collect::<Vec<_>>();
            state.hub.clear();
            state.validators.clear();
            state.index.clear();
            widgets
        };
        for widget in &widgets {
            self.inner.container.remove(widget.as_ref());
        }
        tracing::debug!(form = %self.inner.id, count = widgets.len(), "unbound all widgets");
        Ok(())
    }

    /// Key to value for every bound widget, in the container's child order.
    pub fn get_params(&self) -> FormResult<IndexMap<String, String>> {
        let children = self.inner.container.children();
        let state = read_state(&self.inner.state, "collecting params")?;
        let mut params = IndexMap::with_capacity(state.index.len());
        for child in children {
            let Some(key) = state.index.key_of(child.id()) else {
                continue;
            };
            params.insert(
                key.to_string(),
                state.converters.extract_value(child.as_ref()),
            );
        }
        Ok(params)
    }

    pub fn get_value(&self, key: &str) -> FormResult<Option<String>> {
        let state = read_state(&self.inner.state, "reading value")?;
        Ok(state
            .index
            .widget(key)
            .map(|widget| state.converters.extract_value(widget.as_ref())))
    }

    pub fn get_widget(&self, key: &str) -> FormResult<Option<WidgetHandle>> {
        Ok(read_state(&self.inner.state, "reading widget")?
            .index
            .widget(key)
            .cloned())
    }

    pub fn get_key(&self, widget: &dyn Widget) -> FormResult<Option<String>> {
        Ok(read_state(&self.inner.state, "reading key")?
            .index
            .key_of(widget.id())
            .map(str::to_string))
    }

    pub fn contains_key(&self, key: &str) -> FormResult<bool> {
        Ok(read_state(&self.inner.state, "reading keys")?
            .index
            .contains_key(key))
    }

    pub fn len(&self) -> FormResult<usize> {
        Ok(read_state(&self.inner.state, "counting bindings")?.index.len())
    }

    pub fn is_empty(&self) -> FormResult<bool> {
        Ok(self.len()? == 0)
    }

    pub(super) fn guard_binding(
        &self,
        key: &str,
        widget: Option<WidgetId>,
        context: &'static str,
    ) -> FormResult<()> {
        let busy = self
            .inner
            .in_flight
            .borrow()
            .iter()
            .any(|flight| flight.key == key || widget == Some(flight.widget));
        if busy {
            return Err(FormError::Reentrant(context));
        }
        Ok(())
    }
}

pub(super) fn read_state<'a>(
    state: &'a RefCell<FormState>,
    context: &'static str,
) -> FormResult<Ref<'a, FormState>> {
    state
        .try_borrow()
        .map_err(|_| FormError::Reentrant(context))
}

pub(super) fn write_state<'a>(
    state: &'a RefCell<FormState>,
    context: &'static str,
) -> FormResult<RefMut<'a, FormState>> {
    state
        .try_borrow_mut()
        .map_err(|_| FormError::Reentrant(context))
}
