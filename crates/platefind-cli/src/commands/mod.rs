pub mod import;
pub mod search;
pub mod status;
