//! scalarlog: log named scalars to TensorBoard event files.
//!
//! Most programs create a [`Logger`] and pass it where it is needed. For
//! quick instrumentation the [`global`] module keeps an opt-in process-wide
//! default logger behind [`record`].
//!
//! ```no_run
//! # fn main() -> scalarlog::Result<()> {
//! let mut logger = scalarlog::Logger::open("runs/exp1")?;
//! logger.log("loss", 0.25, None)?;
//! logger.log_list_statistics("reward", &[1.0, 2.0, 3.0])?;
//!
//! scalarlog::record("episodes", 1.0, None)?; // lands in ./logs
//! # Ok(())
//! # }
//! ```

pub use scalarlog_core::*;

pub mod global;

pub use global::{
    close_default, configure_default, configure_default_sink, configure_default_target,
    default_event_file, record, with_default,
};
