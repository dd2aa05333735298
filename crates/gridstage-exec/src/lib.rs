mod error;
pub use error::{ExecError, ExecResult};

mod args;
pub use args::ProducerArgs;

mod config;
pub use config::{DEFAULT_INTERPRETER, ProducerConfig, SENTINEL_FILE};

mod sentinel;
pub use sentinel::CompletionSentinel;

pub mod producer;
pub use producer::{Producer, RunOutcome};

mod util;

pub mod utils;

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::{CompletionSentinel, Producer, ProducerArgs, ProducerConfig, RunOutcome};
}
