pub mod analysis;
pub mod config;
pub mod market;
pub mod output;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
