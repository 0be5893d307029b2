//! CLI command implementations

pub mod catalog;
pub mod completions;
pub mod config;
pub mod console;
pub mod paginate;
pub mod split;
pub mod status;
pub mod token;

pub use catalog::execute as catalog;
pub use completions::execute as completions;
pub use config::execute as config;
pub use console::execute as console;
pub use paginate::execute as paginate;
pub use split::execute as split;
pub use status::execute as status;
pub use token::execute as token;
