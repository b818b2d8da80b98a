pub mod routes;
pub mod server;

pub use routes::build_router;
pub use server::{serve, shutdown_signal};
