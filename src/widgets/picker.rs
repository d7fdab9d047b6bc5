use std::cell::Cell;

use calmform_derive::Widget;
use chrono::{NaiveDate, NaiveTime};

use crate::contracts::WidgetBase;
use crate::signal::{Connection, Signal};

/// Form value of a date: `year/month/day`, month 1-based and unpadded.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%-m/%-d").to_string()
}

/// Form value of a time: 24-hour clock, minutes zero-padded.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-H:%M").to_string()
}

#[derive(Widget)]
pub struct DatePicker {
    base: WidgetBase,
    date: Cell<NaiveDate>,
    changed: Signal<NaiveDate>,
}

impl DatePicker {
    pub fn new(initial: NaiveDate) -> Self {
        Self {
            base: WidgetBase::new(),
            date: Cell::new(initial),
            changed: Signal::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date.get()
    }

    pub fn set_date(&self, date: NaiveDate) {
        if self.date.replace(date) != date {
            self.changed.emit(&date);
        }
    }

    pub fn on_date_change(&self, handler: impl Fn(&NaiveDate) + 'static) -> Connection {
        self.changed.connect(handler)
    }
}

#[derive(Widget)]
pub struct TimePicker {
    base: WidgetBase,
    time: Cell<NaiveTime>,
    changed: Signal<NaiveTime>,
}

impl TimePicker {
    pub fn new(initial: NaiveTime) -> Self {
        Self {
            base: WidgetBase::new(),
            time: Cell::new(initial),
            changed: Signal::new(),
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time.get()
    }

    pub fn set_time(&self, time: NaiveTime) {
        if self.time.replace(time) != time {
            self.changed.emit(&time);
        }
    }

    pub fn on_time_change(&self, handler: impl Fn(&NaiveTime) + 'static) -> Connection {
        self.changed.connect(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn pickers_format_for_forms() {
        let date = NaiveDate::from_ymd_opt(2015, 7, 4).expect("valid date");
        assert_eq!(format_date(date), "2015/7/4");
        let time = NaiveTime::from_hms_opt(9, 5, 0).expect("valid time");
        assert_eq!(format_time(time), "9:05");
        let time = NaiveTime::from_hms_opt(23, 59, 0).expect("valid time");
        assert_eq!(format_time(time), "23:59");
    }

    #[test]
    fn date_change_fires_only_on_a_new_date() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 29).expect("leap day");
        let picker = DatePicker::new(first);
        let seen = Rc::new(Cell::new(0));
        let _connection = {
            let seen = seen.clone();
            picker.on_date_change(move |_| seen.set(seen.get() + 1))
        };

        picker.set_date(first);
        assert_eq!(seen.get(), 0);
        picker.set_date(first.succ_opt().expect("next day"));
        assert_eq!(seen.get(), 1);
        assert_eq!(format_date(picker.date()), "2024/3/1");
    }
}
