//! CLI command implementations

mod context;
mod list;
mod query;
pub mod style;

pub use list::run_list;
pub use query::run_query;
