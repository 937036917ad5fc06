//! Signal distribution: the latest-signal cache, the fixed-interval cycle
//! scheduler and the WebSocket fan-out to subscribers.

mod cache;
mod error;
mod hub;
mod scheduler;
mod server;
mod shutdown;

pub use cache::SignalCache;
pub use error::ServerError;
pub use hub::{SignalHub, Subscription};
pub use scheduler::{
    BroadcastScheduler, CycleReport, SchedulerConfig, SchedulerHandle, SchedulerPhase,
};
pub use server::{handle_connection, serve};
pub use shutdown::{ShutdownListener, ShutdownSignal};
