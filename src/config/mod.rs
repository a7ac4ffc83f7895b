//! Configuration module

mod site;

pub use site::ImagesConfig;
pub use site::SeoConfig;
pub use site::SiteConfig;
pub use site::ViewsConfig;
pub use site::WritingsConfig;
