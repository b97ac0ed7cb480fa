//! Dashboard HTTP handlers

pub mod data;
pub mod health;
pub mod ui;

pub use data::data_routes;
pub use health::health_routes;
pub use ui::ui_routes;
