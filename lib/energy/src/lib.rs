mod accumulator;
mod channel;
pub mod persistence;
mod port;
mod reading;
mod state;
pub mod time;
pub mod unit;

pub use accumulator::{Accumulator, TickOutcome};
pub use channel::{Channel, CopKind};
pub use port::{SensorSource, StateStore};
pub use reading::{CopValues, HourlyReadings, sanitize};
pub use state::{EnergyState, Totals};
pub use unit::round_to;
