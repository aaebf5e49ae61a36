pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod logger;
pub mod model;
pub mod presentation;
pub mod service;

pub trait Located {
    fn location(&self) -> snafu::Location;
}
