use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::id::WidgetId;
use crate::signal::Subscription;

/// Exact runtime kind of a widget.
///
/// Two kinds are equal only when they name the same concrete type; there is no
/// notion of a supertype, so lookups keyed by kind never fall back.
#[derive(Clone, Copy)]
pub struct WidgetKind {
    type_id: TypeId,
    name: &'static str,
}

impl WidgetKind {
    pub fn of<W: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<W>(),
            name: std::any::type_name::<W>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for WidgetKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for WidgetKind {}

impl Hash for WidgetKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for WidgetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Identity and parent slot shared by every widget.
pub struct WidgetBase {
    id: WidgetId,
    parent: RefCell<Option<Weak<dyn Container>>>,
}

impl WidgetBase {
    pub fn new() -> Self {
        Self {
            id: WidgetId::next(),
            parent: RefCell::new(None),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn parent(&self) -> Option<Rc<dyn Container>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Called by a [`Container`] when it takes the widget in.
    pub fn attach(&self, parent: Weak<dyn Container>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    /// Called by a [`Container`] when it lets the widget go.
    pub fn detach(&self) {
        self.parent.borrow_mut().take();
    }
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for WidgetBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.id)
            .field("attached", &self.parent().is_some())
            .finish()
    }
}

/// An input element that can be bound into a form.
///
/// Implement it with `#[derive(Widget)]`; the derive wires `base` and `as_any`
/// and, with `#[widget(form_part)]`, routes `as_form_part` to the type's own
/// [`FormPart`] impl.
pub trait Widget: Any {
    fn base(&self) -> &WidgetBase;

    fn as_any(&self) -> &dyn Any;

    fn kind(&self) -> WidgetKind {
        WidgetKind::of::<Self>()
    }

    fn as_form_part(&self) -> Option<&dyn FormPart> {
        None
    }

    fn id(&self) -> WidgetId {
        self.base().id()
    }

    fn parent(&self) -> Option<Rc<dyn Container>> {
        self.base().parent()
    }
}

pub type WidgetHandle = Rc<dyn Widget>;

impl dyn Widget {
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        self.as_any().downcast_ref::<W>()
    }

    pub fn is<W: Widget>(&self) -> bool {
        self.as_any().is::<W>()
    }
}

impl Debug for dyn Widget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}

/// Callback a change wiring invokes when a widget's value changed.
pub type ChangeNotify = Rc<dyn Fn(WidgetId)>;

/// Self-serialization capability.
///
/// A widget exposing it reports its own value; converters are not consulted.
pub trait FormPart {
    fn to_value(&self) -> String;

    /// Hooks the widget's own change signal. Widgets returning `None` fall back
    /// to the change wiring registered for their kind.
    fn watch(&self, _notify: ChangeNotify) -> Option<Subscription> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    MatchParent,
    WrapContent,
    Px(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
}

impl LayoutParams {
    pub const fn new(width: Dimension, height: Dimension) -> Self {
        Self { width, height }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: Dimension::MatchParent,
            height: Dimension::WrapContent,
        }
    }
}

/// Visual parent the form inserts its widgets into.
pub trait Container {
    /// Inserts `widget` at `index`, or appends when `index` is `None`.
    fn insert(&self, widget: WidgetHandle, index: Option<usize>, params: Option<LayoutParams>);

    /// Returns `false` if `widget` was not a child.
    fn remove(&self, widget: &dyn Widget) -> bool;

    fn child_count(&self) -> usize;

    fn child_at(&self, index: usize) -> Option<WidgetHandle>;

    fn children(&self) -> Vec<WidgetHandle> {
        (0..self.child_count())
            .filter_map(|index| self.child_at(index))
            .collect()
    }
}
