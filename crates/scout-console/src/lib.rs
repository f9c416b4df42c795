//! Scout console: the query view, its render model, and the terminal front ends.

pub mod archive;
pub mod config;
pub mod console;
pub mod oneshot;
pub mod render;
pub mod view;

pub use config::ScoutConfig;
pub use render::RenderModel;
pub use view::{QueryView, Submission};
