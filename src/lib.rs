pub mod config;
pub mod constants;
pub mod drivers;
pub mod event_loop;
pub mod events;
pub mod geometry;
pub mod host;
pub mod media;
pub mod registry;
pub mod shell;
pub mod surface;
pub mod terminal_host;
pub mod tracing_sub;
pub mod window;
