//! Platform abstraction layer
//!
//! Each platform provides a `shortcut` module exposing
//! `SystemShortcutReader`, the facility that reads `.lnk` targets.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(target_os = "windows"))]
pub mod other;

#[cfg(target_os = "windows")]
pub use windows as current;

#[cfg(not(target_os = "windows"))]
pub use other as current;

pub use current::shortcut::SystemShortcutReader;
