mod activity;
mod client_package;
mod connection_log;
mod device;
mod support_code;

pub use activity::*;
pub use client_package::*;
pub use connection_log::*;
pub use device::*;
pub use support_code::*;
