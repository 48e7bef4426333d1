//! CLI command implementations

pub(crate) mod common;
pub(crate) mod compile;
pub(crate) mod ls;
pub(crate) mod run;
