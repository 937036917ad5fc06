//! Observability for the signal service.

mod logging;

pub use logging::setup_logging;
