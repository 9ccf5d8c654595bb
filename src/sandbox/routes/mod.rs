//! Sandbox Routes

pub mod blotter;
pub mod documents;
pub mod health;
