use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static WIDGET_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);
static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Identity of a widget instance. Two handles to the same widget share it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn next() -> Self {
        Self(WIDGET_ID_ALLOCATOR.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for WidgetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_ids_are_unique() {
        let ids = (0..8).map(|_| WidgetId::next()).collect::<Vec<_>>();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn form_and_widget_ids_are_allocated_independently() {
        let form = FormId::next();
        let widget = WidgetId::next();
        assert_eq!(form.to_string(), format!("form#{}", form.get()));
        assert_eq!(widget.to_string(), format!("widget#{}", widget.get()));
    }
}
