//! CLC API model types.

mod datacenter;
mod disk;
mod public_ip;
mod server;

pub use datacenter::*;
pub use disk::*;
pub use public_ip::*;
pub use server::*;
