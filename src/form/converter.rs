use std::collections::HashMap;
use std::rc::Rc;

use crate::contracts::{Widget, WidgetKind};
use crate::widgets::{
    Checkbox, DatePicker, LabeledInput, MultiSelect, NumberInput, PasswordInput, Progress, Radio,
    RadioGroup, Rating, Select, Slider, Switch, TextInput, Textarea, TimePicker, ToggleButton,
    format_date, format_time,
};

use super::controller::{FormCoordinator, FormResult, read_state, write_state};

pub type Converter = Rc<dyn Fn(&dyn Widget) -> String>;

/// Value extraction keyed by exact widget kind.
pub struct ConverterRegistry {
    converters: HashMap<WidgetKind, Converter>,
}

impl ConverterRegistry {
    /// Registry with converters for every standard widget kind.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_standard();
        registry
    }

    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: WidgetKind, converter: impl Fn(&dyn Widget) -> String + 'static) {
        self.converters.insert(kind, Rc::new(converter));
    }

    /// Registers a converter for `W`; it only ever sees widgets of that kind.
    pub fn register_for<W: Widget>(&mut self, converter: impl Fn(&W) -> String + 'static) {
        self.register(WidgetKind::of::<W>(), move |widget: &dyn Widget| {
            widget.as_any().downcast_ref::<W>().map(&converter).unwrap_or_default()
        });
    }

    pub fn unregister(&mut self, kind: WidgetKind) -> bool {
        self.converters.remove(&kind).is_some()
    }

    pub fn has(&self, kind: WidgetKind) -> bool {
        self.converters.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn get(&self, kind: WidgetKind) -> Option<Converter> {
        self.converters.get(&kind).cloned()
    }

    /// Current value of `widget`, or `None` when neither the widget itself nor
    /// a converter for its exact kind can produce one.
    pub fn try_extract(&self, widget: &dyn Widget) -> Option<String> {
        if let Some(part) = widget.as_form_part() {
            return Some(part.to_value());
        }
        self.converters
            .get(&widget.kind())
            .map(|converter| converter(widget))
    }

    pub fn extract_value(&self, widget: &dyn Widget) -> String {
        self.try_extract(widget).unwrap_or_default()
    }

    fn register_standard(&mut self) {
        self.register_for::<TextInput>(TextInput::text);
        self.register_for::<PasswordInput>(PasswordInput::text);
        self.register_for::<Textarea>(Textarea::text);

        self.register_for::<Checkbox>(|widget| widget.is_checked().to_string());
        self.register_for::<Switch>(|widget| widget.is_checked().to_string());
        self.register_for::<Radio>(|widget| widget.is_checked().to_string());
        self.register_for::<ToggleButton>(|widget| widget.is_checked().to_string());

        self.register_for::<RadioGroup>(|widget| widget.checked_value().unwrap_or_default());
        self.register_for::<Select>(|widget| {
            widget
                .selected_index()
                .map(|index| index.to_string())
                .unwrap_or_default()
        });
        self.register_for::<MultiSelect>(|widget| {
            widget
                .selected_indices()
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(",")
        });

        self.register_for::<Slider>(|widget| widget.value().to_string());
        self.register_for::<Progress>(|widget| widget.value().to_string());
        self.register_for::<NumberInput>(|widget| widget.value().to_string());
        self.register_for::<Rating>(|widget| widget.value().to_string());

        self.register_for::<DatePicker>(|widget| format_date(widget.date()));
        self.register_for::<TimePicker>(|widget| format_time(widget.time()));

        self.register_for::<LabeledInput>(|widget| widget.input().text());
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormCoordinator {
    /// Registers or replaces the converter for `kind` on this form only.
    pub fn add_converter(
        &self,
        kind: WidgetKind,
        converter: impl Fn(&dyn Widget) -> String + 'static,
    ) -> FormResult<()> {
        write_state(&self.inner.state, "registering converter")?
            .converters
            .register(kind, converter);
        tracing::debug!(form = %self.inner.id, kind = ?kind, "registered converter");
        Ok(())
    }

    pub fn add_converter_for<W: Widget>(
        &self,
        converter: impl Fn(&W) -> String + 'static,
    ) -> FormResult<()> {
        write_state(&self.inner.state, "registering converter")?
            .converters
            .register_for(converter);
        tracing::debug!(form = %self.inner.id, kind = ?WidgetKind::of::<W>(), "registered converter");
        Ok(())
    }

    pub fn remove_converter(&self, kind: WidgetKind) -> FormResult<bool> {
        Ok(write_state(&self.inner.state, "removing converter")?
            .converters
            .unregister(kind))
    }

    pub fn has_converter(&self, kind: WidgetKind) -> FormResult<bool> {
        Ok(read_state(&self.inner.state, "reading converters")?
            .converters
            .has(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{FormPart, WidgetBase};
    use crate::widgets::SelectOption;
    use chrono::{NaiveDate, NaiveTime};
    use calmform_derive::Widget;
    use rust_decimal::Decimal;

    #[derive(Widget)]
    struct Swatch {
        base: WidgetBase,
        hex: &'static str,
    }

    #[derive(Widget)]
    #[widget(form_part)]
    struct Signature {
        #[widget(base)]
        core: WidgetBase,
        strokes: usize,
    }

    impl FormPart for Signature {
        fn to_value(&self) -> String {
            format!("{} strokes", self.strokes)
        }
    }

    #[test]
    fn standard_kinds_convert_to_strings() {
        let registry = ConverterRegistry::new();

        let text = TextInput::new().with_text("Jumpei");
        assert_eq!(registry.extract_value(&text), "Jumpei");

        let switch = Switch::new("on").checked(true);
        assert_eq!(registry.extract_value(&switch), "true");

        let select = Select::new()
            .option(SelectOption::new("a"))
            .option(SelectOption::new("b"));
        assert_eq!(registry.extract_value(&select), "");
        select.select(1);
        assert_eq!(registry.extract_value(&select), "1");

        let slider = Slider::new().with_value(42.0);
        assert_eq!(registry.extract_value(&slider), "42");

        let rating = Rating::new();
        rating.set_value(3.5);
        assert_eq!(registry.extract_value(&rating), "3.5");

        let number = NumberInput::new().with_value(Decimal::new(1250, 2));
        assert_eq!(registry.extract_value(&number), "12.50");

        let date = DatePicker::new(NaiveDate::from_ymd_opt(2015, 12, 1).expect("valid date"));
        assert_eq!(registry.extract_value(&date), "2015/12/1");

        let time = TimePicker::new(NaiveTime::from_hms_opt(9, 5, 0).expect("valid time"));
        assert_eq!(registry.extract_value(&time), "9:05");

        let whole = Rating::new();
        whole.set_value(4.0);
        assert_eq!(registry.extract_value(&whole), "4");

        let labeled = LabeledInput::new("Name");
        labeled.input().set_text("inner");
        assert_eq!(registry.extract_value(&labeled), "inner");
    }

    #[test]
    fn unknown_kind_yields_empty_string() {
        let registry = ConverterRegistry::new();
        let swatch = Swatch {
            base: WidgetBase::new(),
            hex: "#fff",
        };
        assert_eq!(registry.try_extract(&swatch), None);
        assert_eq!(registry.extract_value(&swatch), "");
    }

    #[test]
    fn custom_converters_are_exact_kind_only() {
        let mut registry = ConverterRegistry::empty();
        registry.register_for::<Swatch>(|swatch| swatch.hex.to_string());
        assert!(registry.has(WidgetKind::of::<Swatch>()));

        let swatch = Swatch {
            base: WidgetBase::new(),
            hex: "#0af",
        };
        assert_eq!(registry.extract_value(&swatch), "#0af");
        assert_eq!(registry.extract_value(&TextInput::new().with_text("x")), "");

        assert!(registry.unregister(WidgetKind::of::<Swatch>()));
        assert!(!registry.unregister(WidgetKind::of::<Swatch>()));
        assert_eq!(registry.extract_value(&swatch), "");
    }

    #[test]
    fn self_serialization_wins_over_registry() {
        let mut registry = ConverterRegistry::new();
        registry.register_for::<Signature>(|_| "from registry".to_string());
        let signature = Signature {
            core: WidgetBase::new(),
            strokes: 3,
        };
        assert_eq!(registry.extract_value(&signature), "3 strokes");
    }
}
