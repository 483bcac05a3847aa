//! CLI command implementations

pub mod build;
pub mod exclude;
pub mod query;
pub mod recent;

pub use build::build_command;
pub use exclude::{exclude_command, unexclude_command};
pub use query::query_command;
pub use recent::{opened_command, recent_command};
