pub mod commands;
pub mod ui;
pub mod util;

pub use util::{CommandContext, Overrides, build_orchestrator, build_source, runtime};
