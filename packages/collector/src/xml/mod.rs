//! XML utilities.

mod utils;

pub use utils::{element_children, find_namespaced, get_raw_text, get_tag_name};
