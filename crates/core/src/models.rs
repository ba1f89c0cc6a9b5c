pub mod event;
pub mod registrant;
