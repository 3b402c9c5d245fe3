//! `authz-console`: command-line front end over the console view models.

pub mod args;
pub mod commands;
