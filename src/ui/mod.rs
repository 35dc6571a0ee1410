pub mod progress;
pub mod output;
pub mod prompt;

pub use progress::ProgressManager;
pub use output::{OutputFormatter, OutputMode};
pub use prompt::{pause_for_keypress, InteractiveSession};
