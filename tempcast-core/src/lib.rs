pub mod calendar;
pub mod dataset;
pub mod describe;
pub mod errors;
pub mod forecast;
pub mod interpolate;
pub mod parameters;
pub mod trend;

pub use describe::describe;
pub use forecast::{ForecastEngine, ForecastResult};
