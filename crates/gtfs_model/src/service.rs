use chrono::Weekday;

use crate::{ExceptionType, GtfsDate, Id, Service};

impl Service {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    fn weekday_bit(weekday: Weekday) -> u8 {
        1 << weekday.num_days_from_monday()
    }

    pub fn runs_on_weekday(&self, weekday: Weekday) -> bool {
        self.weekdays & Self::weekday_bit(weekday) != 0
    }

    pub fn set_weekday(&mut self, weekday: Weekday, active: bool) {
        if active {
            self.weekdays |= Self::weekday_bit(weekday);
        } else {
            self.weekdays &= !Self::weekday_bit(weekday);
        }
    }

    pub fn in_range(&self, date: GtfsDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }

    /// Active on `date` iff it is an added exception, or it lies in the
    /// range on an active weekday and is not a removed exception.
    pub fn is_active_on(&self, date: GtfsDate) -> bool {
        match self.exceptions.get(&date) {
            Some(ExceptionType::Added) => true,
            Some(ExceptionType::Removed) => false,
            None => self.in_range(date) && self.runs_on_weekday(date.weekday()),
        }
    }

    pub fn first_active_date(&self) -> Option<GtfsDate> {
        let first_added = self
            .exceptions
            .iter()
            .find(|(_, kind)| **kind == ExceptionType::Added)
            .map(|(date, _)| *date);

        let mut first_regular = None;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if self.weekdays != 0 {
                let mut date = start;
                while date <= end {
                    if self.runs_on_weekday(date.weekday())
                        && self.exceptions.get(&date) != Some(&ExceptionType::Removed)
                    {
                        first_regular = Some(date);
                        break;
                    }
                    if first_added.is_some_and(|added| added <= date) {
                        break;
                    }
                    date = date.add_days(1);
                }
            }
        }

        match (first_added, first_regular) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// A service with no date on which it runs.
    pub fn is_empty(&self) -> bool {
        self.first_active_date().is_none()
    }
}
