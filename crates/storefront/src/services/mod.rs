//! External service clients.

pub mod stripe;
