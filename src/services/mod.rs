//! Service layer: the external collaborators.
//!
//! This module contains the clients the pipeline drives:
//! - Catalog search (`PaapiClient`, behind the `ProductSource` trait)
//! - Broadcast channel (`TelegramBot`, behind the `Publisher` trait)

mod amazon;
mod telegram;

pub use amazon::{PaapiClient, ProductSource};
pub use telegram::{Publisher, TelegramBot};
