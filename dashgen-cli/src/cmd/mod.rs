pub mod build;
pub mod entries;
