pub use crate::error::{Error, Result};
pub use crate::meter::{Meter, MS_15_MIN, MS_1_HR, MS_1_MIN, MS_24_HR, MS_4_HR};

mod error;
mod meter;
mod purge;
pub mod scan;

#[derive(Clone)]
pub struct Config {
    /// Purge day-old events off the meter on an hourly schedule. Requires a
    /// tokio runtime; the first sweep runs 24 hours after construction.
    pub enable_auto_purge: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_auto_purge: false,
        }
    }
}
