pub mod fragments;
pub mod layouts;
pub mod pages;

pub use layouts::PageConfig;
pub use pages::{dashboard::DashboardData, dashboard_page};
