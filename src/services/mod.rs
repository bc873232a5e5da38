pub mod auth_service;
pub mod cart;
pub mod catalog;
pub mod order_service;
pub mod payment;
