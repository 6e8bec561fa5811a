//! Request / response bodies of the `/api` routes.

pub mod chat;
pub mod interview;
pub mod session;
