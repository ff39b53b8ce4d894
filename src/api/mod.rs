pub mod extract;
pub mod handlers;
pub mod layer;
pub mod middleware;
pub mod openapi;
pub mod routes;

pub use extract::ValidatedJson;
pub use layer::{map_errors, with_error_handling};
