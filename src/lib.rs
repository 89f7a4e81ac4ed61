//! Project settings and lifecycle hooks for git worktrees.
//!
//! grove resolves its settings from a project's `.grove.toml`, the operator's
//! `git config`, and compiled-in defaults, then runs the project's hook commands
//! when worktrees are added or created.
//!
//! The library API is not stable.

pub mod config;
pub mod hooks;
pub mod path;
pub mod shell_exec;
pub mod styling;

pub use hooks::HookType;
