pub mod config;
pub mod events;
pub mod export;
pub mod filters;
pub mod images;
