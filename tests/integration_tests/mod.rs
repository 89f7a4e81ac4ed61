// Hook commands are shell strings written for `sh`
#![cfg(unix)]

pub mod config_init;
pub mod config_resolution;
pub mod config_show;
pub mod hook_run;
