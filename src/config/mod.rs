//! Configuration tree access and typed reads

pub mod read;
pub mod section;

pub use read::NumberSigns;
pub use section::ConfigSection;
