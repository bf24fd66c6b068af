//! CLI command implementations

pub(crate) mod common;
pub(crate) mod create;
pub(crate) mod run;
pub(crate) mod status;
pub(crate) mod upgrade_all;
