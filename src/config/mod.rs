//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::StaticRoutesConfig;
pub use site::{API_URL_ENV, DEFAULT_API_URL};
