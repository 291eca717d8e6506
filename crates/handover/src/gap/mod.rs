pub mod class;
pub mod constants;
pub mod types;


pub use class::{DeviceClass, ServiceClass};
pub use constants::*;
pub use types::*;
