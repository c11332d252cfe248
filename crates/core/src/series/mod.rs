//! Time-series data structures

mod element;
mod timeseries;
mod timestamps;

pub use element::SeriesElement;
pub use timeseries::TimeSeries;
pub use timestamps::{day_of_year, days_in_year, Timestamps};
