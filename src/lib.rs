pub mod contracts;
pub mod form;
pub mod id;
pub mod prelude;
pub mod signal;
pub mod widgets;

pub use calmform_derive::Widget;
pub use form::{FormCoordinator, FormError, FormOptions, FormResult};
