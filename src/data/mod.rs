//! Data loading and cleaning

mod clean;
mod loader;

pub use clean::{clean_training_frame, normalize_target, parse_target_value, CleanReport};
pub use loader::load_table;
