/// CLI layer: argument parsing, rendering and output.
pub mod args;
pub mod output;
pub mod render;
pub mod wrap;

pub use args::Cli;
pub use output::{OutputCtx, write_error};
