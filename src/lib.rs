pub mod core;
pub mod error;
pub mod models;

pub use crate::core::{events::ProvisionEvent, settings::ProvisionSettings};
pub use error::{ProcessFailure, ProvisionError};
pub use models::{ModelCatalog, Provisioner};
