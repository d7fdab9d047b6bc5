use std::collections::HashMap;
use std::rc::Rc;

use crate::contracts::{ChangeNotify, WidgetHandle};
use crate::id::WidgetId;

use super::controller::{
    FormCoordinator, FormInner, FormResult, FormState, InFlight, MissingValue, read_state,
    write_state,
};

/// Validity predicate over a field's extracted value.
///
/// `None` means the widget produced no value at all (no converter and no
/// self-serialization), as opposed to `Some("")`.
pub trait FieldValidator {
    fn validate(&self, value: Option<&str>) -> bool;
}

impl<F> FieldValidator for F
where
    F: Fn(Option<&str>) -> bool,
{
    fn validate(&self, value: Option<&str>) -> bool {
        (self)(value)
    }
}

pub type Validator = Rc<dyn FieldValidator>;

/// Last evaluated result per key.
#[derive(Debug, Default)]
pub struct ValidationCache {
    results: HashMap<String, bool>,
}

impl ValidationCache {
    pub fn get(&self, key: &str) -> Option<bool> {
        self.results.get(key).copied()
    }

    pub fn record(&mut self, key: impl Into<String>, valid: bool) {
        self.results.insert(key.into(), valid);
    }

    pub fn remove(&mut self, key: &str) -> Option<bool> {
        self.results.remove(key)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Validator>,
    cache: ValidationCache,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `validator` for `key`. A replaced validator's cached result is
    /// dropped since it no longer describes the current predicate.
    pub fn put(&mut self, key: impl Into<String>, validator: Validator) -> bool {
        let key = key.into();
        let replaced = self.validators.insert(key.clone(), validator).is_some();
        if replaced {
            self.cache.remove(&key);
        }
        replaced
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.cache.remove(key);
        self.validators.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<Validator> {
        self.validators.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.validators.contains_key(key)
    }

    /// Records a result; ignored for keys without a validator.
    pub fn record(&mut self, key: &str, valid: bool) -> bool {
        if !self.validators.contains_key(key) {
            return false;
        }
        self.cache.record(key, valid);
        true
    }

    pub fn result(&self, key: &str) -> Option<bool> {
        self.cache.get(key)
    }

    /// AND over every registered key, counting never-evaluated keys as invalid.
    ///
    /// An empty registry is valid.
    pub fn is_valid(&self) -> bool {
        if self.validators.is_empty() {
            return true;
        }
        self.validators
            .keys()
            .all(|key| self.cache.get(key).unwrap_or(false))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    pub fn clear(&mut self) {
        self.validators.clear();
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl FormCoordinator {
    /// Registers `validator` for an already bound key, replacing any previous
    /// one. Returns `Ok(false)` without registering when `key` is unbound.
    pub fn put_validator(
        &self,
        key: &str,
        validator: impl FieldValidator + 'static,
    ) -> FormResult<bool> {
        self.guard_binding(key, None, "registering validator")?;
        {
            let mut state = write_state(&self.inner.state, "registering validator")?;
            let Some(widget) = state.index.widget(key).cloned() else {
                tracing::debug!(form = %self.inner.id, key = %key, "validator ignored for unbound key");
                return Ok(false);
            };
            self.install_validator(&mut state, key, &widget, Rc::new(validator));
        }
        if self.inner.options.validate_on_register {
            self.evaluate(key);
        }
        Ok(true)
    }

    pub fn remove_validator(&self, key: &str) -> FormResult<bool> {
        self.guard_binding(key, None, "removing validator")?;
        let mut state = write_state(&self.inner.state, "removing validator")?;
        if let Some(id) = state.index.widget(key).map(|widget| widget.id()) {
            state.hub.unsubscribe(id);
        }
        Ok(state.validators.remove(key))
    }

    pub fn has_validator(&self, key: &str) -> FormResult<bool> {
        Ok(read_state(&self.inner.state, "reading validators")?
            .validators
            .contains(key))
    }

    /// True when every registered validator last evaluated to true. A key
    /// whose widget has not changed since registration counts as invalid.
    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(read_state(&self.inner.state, "reading validity")?
            .validators
            .is_valid())
    }

    pub fn validation_result(&self, key: &str) -> FormResult<Option<bool>> {
        Ok(read_state(&self.inner.state, "reading validity")?
            .validators
            .result(key))
    }

    /// Evaluates every validator against the current values, then reports
    /// overall validity.
    pub fn validate(&self) -> FormResult<bool> {
        let keys = read_state(&self.inner.state, "collecting validators")?
            .validators
            .keys()
            .map(str::to_string)
            .collect::<Vec<_>>();
        for key in &keys {
            self.evaluate(key);
        }
        self.is_valid()
    }

    pub(super) fn install_validator(
        &self,
        state: &mut FormState,
        key: &str,
        widget: &WidgetHandle,
        validator: Validator,
    ) {
        if state.validators.put(key, validator) {
            tracing::debug!(form = %self.inner.id, key = %key, "replaced validator");
        } else {
            tracing::debug!(form = %self.inner.id, key = %key, "registered validator");
        }
        state.hub.subscribe(widget.as_ref(), self.change_notify());
    }

    fn change_notify(&self) -> ChangeNotify {
        let inner = Rc::downgrade(&self.inner);
        Rc::new(move |widget: WidgetId| {
            if let Some(inner) = inner.upgrade() {
                FormCoordinator { inner }.handle_change(widget);
            }
        })
    }

    fn handle_change(&self, widget: WidgetId) {
        let key = match read_state(&self.inner.state, "resolving changed widget") {
            Ok(state) => state.index.key_of(widget).map(str::to_string),
            Err(error) => {
                tracing::warn!(form = %self.inner.id, %widget, %error, "dropped change notification");
                return;
            }
        };
        if let Some(key) = key {
            self.evaluate(&key);
        }
    }

    /// Runs the validator for `key` and caches its result.
    pub(super) fn evaluate(&self, key: &str) -> Option<bool> {
        let (widget, validator, value) = {
            let state = match read_state(&self.inner.state, "evaluating validator") {
                Ok(state) => state,
                Err(error) => {
                    tracing::warn!(form = %self.inner.id, key = %key, %error, "skipped evaluation");
                    return None;
                }
            };
            let widget = state.index.widget(key)?;
            let validator = state.validators.get(key)?;
            (
                widget.id(),
                validator,
                state.converters.try_extract(widget.as_ref()),
            )
        };
        let value = match self.inner.options.missing_value {
            MissingValue::Absent => value,
            MissingValue::Empty => Some(value.unwrap_or_default()),
        };

        let valid = {
            let _flight = FlightGuard::enter(&self.inner, key, widget);
            validator.validate(value.as_deref())
        };

        match write_state(&self.inner.state, "recording validation result") {
            Ok(mut state) => {
                state.validators.record(key, valid);
            }
            Err(error) => {
                tracing::warn!(form = %self.inner.id, key = %key, %error, "dropped validation result");
            }
        }
        tracing::trace!(form = %self.inner.id, key = %key, valid, "evaluated validator");
        Some(valid)
    }
}

/// Marks a key as under evaluation until dropped. Nested evaluations stack.
struct FlightGuard<'a> {
    inner: &'a FormInner,
}

impl<'a> FlightGuard<'a> {
    fn enter(inner: &'a FormInner, key: &str, widget: WidgetId) -> Self {
        inner.in_flight.borrow_mut().push(InFlight {
            key: key.to_string(),
            widget,
        });
        Self { inner }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.inner.in_flight.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_empty() -> Validator {
        Rc::new(|value: Option<&str>| value.is_some_and(|value| !value.is_empty()))
    }

    #[test]
    fn empty_registry_is_vacuously_valid() {
        let registry = ValidatorRegistry::new();
        assert!(registry.is_valid());
    }

    #[test]
    fn unevaluated_validator_counts_as_invalid() {
        let mut registry = ValidatorRegistry::new();
        registry.put("name", not_empty());
        assert_eq!(registry.result("name"), None);
        assert!(!registry.is_valid());

        assert!(registry.record("name", true));
        assert!(registry.is_valid());
    }

    #[test]
    fn is_valid_is_conjunction_of_cached_results() {
        let mut registry = ValidatorRegistry::new();
        registry.put("name", not_empty());
        registry.put("mail", not_empty());
        registry.record("name", true);
        registry.record("mail", false);
        assert!(!registry.is_valid());

        registry.record("mail", true);
        assert!(registry.is_valid());
    }

    #[test]
    fn results_for_unknown_keys_are_not_cached() {
        let mut registry = ValidatorRegistry::new();
        assert!(!registry.record("ghost", true));
        assert!(registry.cache().is_empty());
    }

    #[test]
    fn replacing_or_removing_drops_cached_result() {
        let mut registry = ValidatorRegistry::new();
        registry.put("name", not_empty());
        registry.record("name", true);

        assert!(registry.put("name", not_empty()));
        assert_eq!(registry.result("name"), None);

        registry.record("name", true);
        assert!(registry.remove("name"));
        assert_eq!(registry.result("name"), None);
        assert!(registry.is_empty());
        assert!(registry.is_valid());
    }

    #[test]
    fn predicates_see_absent_values() {
        let validator = not_empty();
        assert!(!validator.validate(None));
        assert!(!validator.validate(Some("")));
        assert!(validator.validate(Some("Jumpei")));
    }
}
