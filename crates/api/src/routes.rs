pub mod availability;
pub mod event;
pub mod health;
pub mod participant;
pub mod registration;
