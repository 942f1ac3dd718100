//! Command handlers dispatched from `main`

pub mod run;
pub mod sites;
