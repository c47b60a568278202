pub mod config;
pub mod draft;
pub mod gateway;
pub mod model;

pub use config::{AppConfig, ConfigOverrides};
pub use draft::{DraftError, TaskDraft};
pub use gateway::{GatewayError, HttpGateway, InMemoryGateway, TaskGateway};
pub use model::*;
