//! Lead review for studio staff.

pub mod routes;

pub use routes::{AdminRouteState, admin_routes};
