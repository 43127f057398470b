pub mod errors;
pub mod shutdown;
pub mod utils;
pub mod validations;

pub use errors::{AppError, InfraError};
pub use shutdown::{listen_for_shutdown_signals, ShutdownSignal};
pub use utils::*;
pub use validations::*;
