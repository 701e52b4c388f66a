pub mod logging;
pub mod runner;

pub use logging::init_logging;
pub use runner::{SceneOptions, SceneRunner, Walker};
