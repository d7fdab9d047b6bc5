pub use crate::contracts::{
    Container, Dimension, FormPart, LayoutParams, Widget, WidgetBase, WidgetHandle, WidgetKind,
};
pub use crate::form::validators;
pub use crate::form::{
    AddOptions, FieldValidator, FormCoordinator, FormError, FormOptions, FormResult, MissingValue,
};
pub use crate::widgets::{
    Checkbox, DatePicker, LabeledInput, MultiSelect, NumberInput,
    PasswordInput, Progress, Radio, RadioGroup, RadioOption, Rating, Select, SelectOption, Slider,
    Stack, Switch, TextInput, Textarea, TimePicker, ToggleButton,
};
