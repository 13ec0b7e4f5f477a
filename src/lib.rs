pub mod app;
pub mod color;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod keyword;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod store;
pub mod theme;

pub use error::{AppError, AppResult};
