pub mod logging;
pub mod progress;

pub use logging::truncate_text;
