pub mod client;
pub mod error;
pub mod types;

pub use client::{ConnectClient, EntitlementService};
pub use error::ConnectError;
pub use types::{ActivatedProduct, Addon, Credentials, Product, ProductHandle};
