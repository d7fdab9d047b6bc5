use std::collections::HashMap;

use crate::contracts::WidgetHandle;
use crate::id::WidgetId;

use super::controller::{FormError, FormResult};

/// Key <-> widget bijection.
///
/// Both directions are updated together; a conflicting `put` is rejected as a
/// whole instead of overwriting one side.
#[derive(Default)]
pub struct KeyWidgetIndex {
    by_key: HashMap<String, WidgetHandle>,
    by_widget: HashMap<WidgetId, String>,
}

impl KeyWidgetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, widget: WidgetHandle) -> FormResult<()> {
        let key = key.into();
        self.check_free(&key, &widget)?;
        self.by_widget.insert(widget.id(), key.clone());
        self.by_key.insert(key, widget);
        self.debug_assert_bijection();
        Ok(())
    }

    /// Fails exactly when `put(key, widget)` would.
    pub fn check_free(&self, key: &str, widget: &WidgetHandle) -> FormResult<()> {
        if self.by_key.contains_key(key) {
            return Err(FormError::DuplicateKey(key.to_string()));
        }
        if let Some(bound_to) = self.by_widget.get(&widget.id()) {
            return Err(FormError::DuplicateWidget {
                key: key.to_string(),
                bound_to: bound_to.clone(),
            });
        }
        Ok(())
    }

    pub fn widget(&self, key: &str) -> Option<&WidgetHandle> {
        self.by_key.get(key)
    }

    pub fn key_of(&self, widget: WidgetId) -> Option<&str> {
        self.by_widget.get(&widget).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn contains_widget(&self, widget: WidgetId) -> bool {
        self.by_widget.contains_key(&widget)
    }

    pub fn remove(&mut self, key: &str) -> Option<WidgetHandle> {
        let widget = self.by_key.remove(key)?;
        self.by_widget.remove(&widget.id());
        self.debug_assert_bijection();
        Some(widget)
    }

    pub fn remove_by_widget(&mut self, widget: WidgetId) -> Option<(String, WidgetHandle)> {
        let key = self.by_widget.remove(&widget)?;
        let handle = self.by_key.remove(&key);
        self.debug_assert_bijection();
        handle.map(|handle| (key, handle))
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.by_widget.clear();
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WidgetHandle)> {
        self.by_key.iter().map(|(key, widget)| (key.as_str(), widget))
    }

    fn debug_assert_bijection(&self) {
        debug_assert_eq!(
            self.by_key.len(),
            self.by_widget.len(),
            "key/widget index directions diverged"
        );
    }
}
