//! Route handlers organized by operation

pub mod health;
pub mod notifications;
pub mod register;
pub mod students;
