//! Destinations a finished still is published to.

mod directory;
mod webhook;

pub use directory::{DirectoryConfig, DirectoryDestination};
pub use webhook::{WebhookConfig, WebhookDestination};
