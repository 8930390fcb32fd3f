mod dashboard;
mod fragments;

pub use dashboard::dashboard_handler;
pub use fragments::summary_fragment_handler;
