pub mod cached;
pub mod odoo;

pub use cached::CachedDirectoryClient;
pub use odoo::OdooDirectoryClient;
