pub mod forecast_routes;

pub use forecast_routes::*;
