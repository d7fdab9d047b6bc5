use std::cell::{Cell, RefCell};

use calmform_derive::Widget;

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

/// Text storage with edit sessions.
///
/// `committed` fires once per settled change: immediately for a standalone
/// `set_text`, at the end of the outermost session for batched edits, and never
/// when the text ends up where it started.
pub(crate) struct TextBuffer {
    text: RefCell<String>,
    depth: Cell<u32>,
    session_start: RefCell<Option<String>>,
    committed: Signal<String>,
}

impl TextBuffer {
    pub(crate) fn new() -> Self {
        Self {
            text: RefCell::new(String::new()),
            depth: Cell::new(0),
            session_start: RefCell::new(None),
            committed: Signal::new(),
        }
    }

    pub(crate) fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.text.borrow().chars().count()
    }

    pub(crate) fn set_text(&self, next: String) {
        if self.depth.get() > 0 {
            *self.text.borrow_mut() = next;
            return;
        }
        if *self.text.borrow() == next {
            return;
        }
        *self.text.borrow_mut() = next;
        self.commit();
    }

    pub(crate) fn edit(&self, f: impl FnOnce(&mut String)) {
        self.begin_edit();
        {
            let mut text = self.text.borrow_mut();
            f(&mut text);
        }
        self.end_edit();
    }

    pub(crate) fn begin_edit(&self) {
        if self.depth.get() == 0 {
            *self.session_start.borrow_mut() = Some(self.text());
        }
        self.depth.set(self.depth.get() + 1);
    }

    pub(crate) fn end_edit(&self) {
        let depth = self.depth.get();
        if depth == 0 {
            return;
        }
        self.depth.set(depth - 1);
        if depth > 1 {
            return;
        }
        let start = self.session_start.borrow_mut().take();
        if start.as_deref() != Some(self.text.borrow().as_str()) {
            self.commit();
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.depth.get() > 0
    }

    pub(crate) fn on_committed(&self, handler: impl Fn(&String) + 'static) -> Connection {
        self.committed.connect(handler)
    }

    fn commit(&self) {
        let current = self.text();
        self.committed.emit(&current);
    }
}

macro_rules! impl_text_api {
    ($type:ty) => {
        impl $type {
            pub fn with_text(self, text: impl Into<String>) -> Self {
                self.buffer.set_text(text.into());
                self
            }

            pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
                self.placeholder = placeholder.into();
                self
            }

            pub fn placeholder_text(&self) -> &str {
                &self.placeholder
            }

            pub fn text(&self) -> String {
                self.buffer.text()
            }

            pub fn len(&self) -> usize {
                self.buffer.len()
            }

            pub fn is_empty(&self) -> bool {
                self.buffer.len() == 0
            }

            pub fn set_text(&self, text: impl Into<String>) {
                self.buffer.set_text(text.into());
            }

            pub fn clear(&self) {
                self.buffer.set_text(String::new());
            }

            /// Applies `f` as one edit session; listeners see at most one change.
            pub fn edit(&self, f: impl FnOnce(&mut String)) {
                self.buffer.edit(f);
            }

            pub fn begin_edit(&self) {
                self.buffer.begin_edit();
            }

            pub fn end_edit(&self) {
                self.buffer.end_edit();
            }

            pub fn is_editing(&self) -> bool {
                self.buffer.is_editing()
            }

            pub fn on_text_committed(&self, handler: impl Fn(&String) + 'static) -> Connection {
                self.buffer.on_committed(handler)
            }
        }
    };
}

#[derive(Widget)]
pub struct TextInput {
    base: WidgetBase,
    placeholder: String,
    buffer: TextBuffer,
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            placeholder: String::new(),
            buffer: TextBuffer::new(),
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl_text_api!(TextInput);

#[derive(Widget)]
pub struct PasswordInput {
    base: WidgetBase,
    placeholder: String,
    buffer: TextBuffer,
}

impl PasswordInput {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            placeholder: String::new(),
            buffer: TextBuffer::new(),
        }
    }

    pub fn masked(&self) -> String {
        "\u{2022}".repeat(self.buffer.len())
    }
}

impl Default for PasswordInput {
    fn default() -> Self {
        Self::new()
    }
}

impl_text_api!(PasswordInput);

#[derive(Widget)]
pub struct Textarea {
    base: WidgetBase,
    placeholder: String,
    min_rows: usize,
    buffer: TextBuffer,
}

impl Textarea {
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(),
            placeholder: String::new(),
            min_rows: 2,
            buffer: TextBuffer::new(),
        }
    }

    pub fn min_rows(mut self, value: usize) -> Self {
        self.min_rows = value.max(1);
        self
    }

    pub fn line_count(&self) -> usize {
        self.buffer.text().lines().count().max(self.min_rows)
    }
}

impl Default for Textarea {
    fn default() -> Self {
        Self::new()
    }
}

impl_text_api!(Textarea);
