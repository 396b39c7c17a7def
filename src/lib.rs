pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod menu_model;
pub mod model;
pub mod opener;
pub mod shortcut;
pub mod tray_state;
pub mod watch;

// Platform abstraction layer
pub mod platform;

pub mod ui {
    pub mod icon;
    pub mod menu;
}

// Tray event loop (needs a system tray the toolkit supports)
#[cfg(any(target_os = "windows", target_os = "macos"))]
pub mod app;

#[cfg(any(target_os = "windows", target_os = "macos"))]
pub use app::run;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn run(_cli: cli::Cli) -> anyhow::Result<()> {
    anyhow::bail!("tray-folder needs a Windows or macOS system tray")
}
