// Each subcommand maps to one runtime service. Handlers turn the service's
// progress events into report lines; services never print.

mod args;
mod commands;
mod handlers;
pub mod output;
pub mod types;

pub use args::{Cli, Commands, ProgressArgs};
pub use commands::run;
