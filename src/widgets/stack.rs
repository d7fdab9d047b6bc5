use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::contracts::{Container, LayoutParams, Widget, WidgetHandle};

struct Child {
    widget: WidgetHandle,
    params: Option<LayoutParams>,
}

/// Vertical list container.
///
/// Inserting a widget that already has a parent moves it here. An insertion
/// index past the end appends.
pub struct Stack {
    this: Weak<Stack>,
    children: RefCell<Vec<Child>>,
}

impl Stack {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn params_at(&self, index: usize) -> Option<LayoutParams> {
        self.children
            .borrow()
            .get(index)
            .and_then(|child| child.params)
    }

    pub fn index_of(&self, widget: &dyn Widget) -> Option<usize> {
        let id = widget.id();
        self.children
            .borrow()
            .iter()
            .position(|child| child.widget.id() == id)
    }

    /// Moves the child at `from` so it ends up at `to`.
    pub fn move_child(&self, from: usize, to: usize) -> bool {
        let mut children = self.children.borrow_mut();
        if from >= children.len() {
            return false;
        }
        let child = children.remove(from);
        let to = to.min(children.len());
        children.insert(to, child);
        true
    }

    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.children.borrow_mut());
        for child in removed {
            child.widget.base().detach();
        }
    }
}

impl Container for Stack {
    fn insert(&self, widget: WidgetHandle, index: Option<usize>, params: Option<LayoutParams>) {
        if let Some(parent) = widget.parent() {
            parent.remove(widget.as_ref());
        }
        {
            let mut children = self.children.borrow_mut();
            let at = index.map_or(children.len(), |index| index.min(children.len()));
            children.insert(
                at,
                Child {
                    widget: widget.clone(),
                    params,
                },
            );
        }
        let parent: Weak<dyn Container> = self.this.clone();
        widget.base().attach(parent);
    }

    fn remove(&self, widget: &dyn Widget) -> bool {
        let id = widget.id();
        let removed = {
            let mut children = self.children.borrow_mut();
            let Some(position) = children.iter().position(|child| child.widget.id() == id) else {
                return false;
            };
            children.remove(position)
        };
        removed.widget.base().detach();
        true
    }

    fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn child_at(&self, index: usize) -> Option<WidgetHandle> {
        self.children
            .borrow()
            .get(index)
            .map(|child| child.widget.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::Dimension;
    use crate::widgets::{Checkbox, TextInput};

    #[test]
    fn insert_attaches_and_remove_detaches() {
        let stack = Stack::new();
        let input: WidgetHandle = Rc::new(TextInput::new());

        stack.insert(input.clone(), None, None);
        assert_eq!(stack.child_count(), 1);
        assert!(input.parent().is_some());

        assert!(stack.remove(input.as_ref()));
        assert!(input.parent().is_none());
        assert!(!stack.remove(input.as_ref()));
    }

    #[test]
    fn insert_moves_widget_between_parents() {
        let first = Stack::new();
        let second = Stack::new();
        let checkbox: WidgetHandle = Rc::new(Checkbox::new("ok"));

        first.insert(checkbox.clone(), None, None);
        second.insert(checkbox.clone(), Some(9), None);
        assert_eq!(first.child_count(), 0);
        assert_eq!(second.index_of(checkbox.as_ref()), Some(0));
    }

    #[test]
    fn positions_and_params_follow_insertion() {
        let stack = Stack::new();
        let a: WidgetHandle = Rc::new(TextInput::new());
        let b: WidgetHandle = Rc::new(TextInput::new());
        let params = LayoutParams::new(Dimension::Px(120.0), Dimension::WrapContent);

        stack.insert(a.clone(), None, None);
        stack.insert(b.clone(), Some(0), Some(params));
        assert_eq!(stack.params_at(0), Some(params));
        assert_eq!(stack.index_of(a.as_ref()), Some(1));

        assert!(stack.move_child(0, 5));
        assert_eq!(stack.index_of(b.as_ref()), Some(1));
        stack.clear();
        assert!(a.parent().is_none() && b.parent().is_none());
    }
}
