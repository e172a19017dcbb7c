pub mod clear_route;
pub mod health_route;
pub mod stats_route;
