// Adapters layer: concrete implementations of the domain ports.

pub mod notifier;
pub mod site_factory;

pub use notifier::LogNotifier;
pub use site_factory::{SiteFactoryClient, SiteFactoryConnector};
