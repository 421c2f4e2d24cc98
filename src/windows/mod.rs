// Window extraction module
// Cross-stream alignment and fixed-length labeled window derivation

pub mod align;
pub mod extract;
pub mod types;

pub use align::{align_interval, search_sorted_left};
pub use extract::{StreamView, WindowConfig, WindowExtractor};
pub use types::{ExampleClass, LabeledExample, Window, WindowRow, BACKGROUND_LABEL, BACKGROUND_TEMPO};
