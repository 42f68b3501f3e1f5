//! Gift card marketplace services and persistence.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;

#[cfg(test)]
mod test;
