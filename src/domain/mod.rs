pub mod device;
pub mod push;
