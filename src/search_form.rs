// Search form
// Local copies of the search fields; submitting writes them to the shared store in one save

use crate::context::AppContext;
use crate::routes::Route;
use crate::search::{DateBounds, SearchCriteria, MAX_GUESTS, MIN_ADULTS, MIN_CHILDREN};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    destination: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    adult_count: u32,
    child_count: u32,
    bounds: DateBounds,
}

// Keeps a picker range non-empty even when the other date is stale
fn range(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    (start, end.max(start))
}

fn parse_count(input: &str) -> Option<u32> {
    input.trim().parse::<i64>().ok().map(|n| n.clamp(0, u32::MAX as i64) as u32)
}

impl SearchForm {
    /// Starts from whatever the shared store currently holds.
    pub fn new(ctx: &AppContext) -> Self {
        Self::from_criteria(ctx.search().read(), ctx.date_bounds())
    }

    // Restored dates may be stale; pull them into the window and keep them ordered
    pub fn from_criteria(criteria: SearchCriteria, bounds: DateBounds) -> Self {
        let check_in = bounds.clamp(criteria.check_in);
        let check_out = bounds.clamp(criteria.check_out).max(check_in);
        Self {
            destination: criteria.destination,
            check_in,
            check_out,
            adult_count: criteria.adult_count,
            child_count: criteria.child_count,
            bounds,
        }
    }

    pub fn values(&self) -> SearchCriteria {
        SearchCriteria {
            destination: self.destination.clone(),
            check_in: self.check_in,
            check_out: self.check_out,
            adult_count: self.adult_count,
            child_count: self.child_count,
        }
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = destination.into();
    }

    /// Selectable check-in window: ends at the chosen check-out.
    pub fn check_in_range(&self) -> (NaiveDate, NaiveDate) {
        range(self.bounds.min, self.check_out.min(self.bounds.max))
    }

    /// Selectable check-out window: starts at the chosen check-in.
    pub fn check_out_range(&self) -> (NaiveDate, NaiveDate) {
        range(self.check_in.max(self.bounds.min), self.bounds.max)
    }

    // Pickers only offer dates inside their current range
    pub fn set_check_in(&mut self, date: NaiveDate) -> NaiveDate {
        let (start, end) = self.check_in_range();
        self.check_in = date.clamp(start, end);
        self.check_in
    }

    pub fn set_check_out(&mut self, date: NaiveDate) -> NaiveDate {
        let (start, end) = self.check_out_range();
        self.check_out = date.clamp(start, end);
        self.check_out
    }

    pub fn set_adult_count(&mut self, count: u32) -> u32 {
        self.adult_count = count.clamp(MIN_ADULTS, MAX_GUESTS);
        self.adult_count
    }

    pub fn set_child_count(&mut self, count: u32) -> u32 {
        self.child_count = count.clamp(MIN_CHILDREN, MAX_GUESTS);
        self.child_count
    }

    /// Raw text from the numeric input; unparsable text is ignored.
    pub fn set_adult_count_input(&mut self, input: &str) -> u32 {
        match parse_count(input) {
            Some(count) => self.set_adult_count(count),
            None => self.adult_count,
        }
    }

    pub fn set_child_count_input(&mut self, input: &str) -> u32 {
        match parse_count(input) {
            Some(count) => self.set_child_count(count),
            None => self.child_count,
        }
    }

    pub fn clear(&mut self) {
        debug!("clearing search form");
        let defaults = SearchCriteria::default_for(self.bounds.min);
        *self = Self::from_criteria(defaults, self.bounds);
    }

    /// Saves all five fields together and moves to the results page.
    pub fn submit(&self, ctx: &AppContext) -> Route {
        info!(
            destination = %self.destination,
            check_in = %self.check_in,
            check_out = %self.check_out,
            adults = self.adult_count,
            children = self.child_count,
            "submitting search"
        );
        ctx.search().save(
            self.destination.clone(),
            self.check_in,
            self.check_out,
            self.adult_count,
            self.child_count,
        );
        ctx.navigator().go_to(Route::Search);
        Route::Search
    }
}
