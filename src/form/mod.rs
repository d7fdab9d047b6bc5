mod controller;
mod converter;
mod index;
mod notify;
mod validation;
pub mod validators;


pub use controller::{
    AddOptions, FormCoordinator, FormError, FormOptions, FormResult, MissingValue,
};
pub use converter::{Converter, ConverterRegistry};
pub use index::KeyWidgetIndex;
pub use notify::{ChangeNotificationHub, ChangeWiring};
pub use validation::{FieldValidator, ValidationCache, Validator, ValidatorRegistry};
