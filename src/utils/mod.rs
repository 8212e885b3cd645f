pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{safe_truncate_chars, slugify, truncate_with_marker};
pub use url_utils::{join_url, strip_query, strip_tracking_params};
