//! Headless models of the standard input widgets.
//!
//! They hold state and expose native change signals but never render. The
//! form layer only ever sees them through [`crate::contracts::Widget`].

mod choice;
mod labeled;
mod picker;
mod range;
mod rating;
mod stack;
mod text_input;
mod toggle;

pub use choice::{MultiSelect, RadioGroup, RadioOption, Select, SelectOption};
pub use labeled::LabeledInput;
pub use picker::{DatePicker, TimePicker, format_date, format_time};
pub use range::{NumberInput, Progress, Slider};
pub use rating::Rating;
pub use stack::Stack;
pub use text_input::{PasswordInput, TextInput, Textarea};
pub use toggle::{Checkbox, Radio, Switch, ToggleButton};
