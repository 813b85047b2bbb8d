pub mod core;
pub mod correspondence;
pub mod records;
pub mod remarks;
