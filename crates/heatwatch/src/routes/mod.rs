pub mod dashboard;
pub mod error;
pub mod forecasts;
pub mod health;
pub mod observations;
pub mod params;
pub mod stations;
pub mod ui;

pub use dashboard::*;
pub use error::*;
pub use forecasts::*;
pub use health::*;
pub use observations::*;
pub use params::*;
pub use stations::*;
pub use ui::*;
