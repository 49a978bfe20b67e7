//! Interactive measurement session: modes, text commands and the handler
//! that applies them to the measurement store.

mod command;
mod handler;
mod mode;

pub use command::{parse_command, Command, CommandError};
pub use handler::{Outcome, Session, SessionOptions};
pub use mode::Mode;
