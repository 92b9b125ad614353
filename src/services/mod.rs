pub mod push;
pub mod subscription_service;
