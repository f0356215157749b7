pub mod auth;
pub mod guard;
pub mod operators;
pub mod usecase;
