pub mod install;
pub mod search;
pub mod usage;
