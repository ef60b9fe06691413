//! Domain models

pub mod book;
pub mod reservation;
pub mod review;
pub mod transaction;
pub mod user;
