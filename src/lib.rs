pub mod cache;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod normalize;
pub mod report;
