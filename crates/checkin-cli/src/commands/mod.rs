pub mod check_in;
pub mod clear_cache;
pub mod common;
pub mod completions;
pub mod load;
pub mod run;
pub mod search;
pub mod status;
pub mod sync;
