//! Shared infrastructure for service tests.

mod context;
mod db;

pub(crate) use context::TestContext;
