use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use notify::RecursiveMode;
use tray_icon::menu::{Menu, MenuEvent};
use tray_icon::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use winit::event::{Event, StartCause};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};

use crate::cli::Cli;
use crate::config::{Config, get_config_path, load_and_validate_config, load_or_create_config};
use crate::menu_model::MenuModelBuilder;
use crate::model::*;
use crate::opener::{ApplicationController, ShellOpener, dispatch_activation};
use crate::platform::SystemShortcutReader;
use crate::tray_state::{IconState, TrayEffect, TrayStateMachine};
use crate::ui::icon::create_tray_icon;
use crate::ui::menu::{RenderedMenus, build_tooltip, parse_menu_action, render_menu};
use crate::watch::{DEFAULT_DEBOUNCE, PathWatcher};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let config = load_or_create_config(&config_path).context("failed to load configuration")?;
    let folder = config
        .resolve_folder(cli.folder.as_deref())
        .with_context(|| {
            format!(
                "set folder.path in {} or pass --folder",
                config_path.display()
            )
        })?;
    info!("///// Init ///// {}", folder.display());

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let proxy = event_loop.create_proxy();
    let tray_receiver = TrayIconEvent::receiver().clone();
    let menu_receiver = MenuEvent::receiver().clone();

    let icon = create_tray_icon(IconState::Idle).context("failed to create tray icon image")?;
    let tray_icon = TrayIconBuilder::new()
        .with_icon(icon)
        .with_tooltip(config.menu.title.clone())
        .build()
        .context("failed to create tray icon")?;
    tray_icon
        .set_visible(true)
        .context("failed to show tray icon")?;

    let _config_watcher = spawn_config_watcher(&config_path, proxy.clone());
    let mut app = TrayApp::new(tray_icon, config, cli.folder, folder, proxy.clone());
    app.rewatch_folder();
    app.refresh_snapshot();

    #[allow(deprecated)]
    let run_result = event_loop.run(move |event, event_loop| match event {
        Event::NewEvents(StartCause::Init) => {
            app.init_anchor(event_loop);
            event_loop
                .set_control_flow(ControlFlow::WaitUntil(Instant::now() + EVENT_POLL_INTERVAL));
        }
        Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
            // Tray and menu events arrive on tray_icon's channels, not through winit
            while let Ok(event) = tray_receiver.try_recv() {
                if let Some(activation) = activation_from_event(&event) {
                    let _ = proxy.send_event(UserEvent::TrayActivated(activation));
                }
            }
            while let Ok(event) = menu_receiver.try_recv() {
                if let Some(action) = parse_menu_action(event.id().as_ref()) {
                    let _ = proxy.send_event(UserEvent::MenuAction(action));
                }
            }
            event_loop
                .set_control_flow(ControlFlow::WaitUntil(Instant::now() + EVENT_POLL_INTERVAL));
        }
        Event::UserEvent(user_event) => app.handle(user_event, event_loop),
        Event::LoopExiting => app.shutdown(),
        _ => {}
    });

    run_result.context("event loop terminated with error")?;
    Ok(())
}

/// Quits by asking the event loop to exit.
struct ProxyController {
    proxy: EventLoopProxy<UserEvent>,
}

impl ApplicationController for ProxyController {
    fn quit(&self) {
        if self.proxy.send_event(UserEvent::QuitRequested).is_err() {
            warn!("Event loop already closed");
        }
    }
}

struct TrayApp {
    tray_icon: TrayIcon,
    machine: TrayStateMachine<SystemShortcutReader>,
    config: Config,
    folder_override: Option<PathBuf>,
    opener: ShellOpener,
    controller: ProxyController,
    proxy: EventLoopProxy<UserEvent>,
    folder_watcher: Option<PathWatcher>,
    /// Models behind the menus handed to the toolkit; menu ids point into them.
    menus: RenderedMenus,
    last_error: Option<String>,
    entry_count: Option<usize>,
    #[cfg(target_os = "windows")]
    anchor: Option<winit::window::Window>,
}

impl TrayApp {
    fn new(
        tray_icon: TrayIcon,
        config: Config,
        folder_override: Option<PathBuf>,
        folder: PathBuf,
        proxy: EventLoopProxy<UserEvent>,
    ) -> Self {
        let builder = MenuModelBuilder::new(SystemShortcutReader::new(), config.menu.title.clone())
            .with_strip_file_extensions(config.menu.strip_file_extensions);
        let machine = TrayStateMachine::new(builder, folder, config.menu.metrics);
        Self {
            tray_icon,
            machine,
            config,
            folder_override,
            opener: ShellOpener::spawn(),
            controller: ProxyController {
                proxy: proxy.clone(),
            },
            proxy,
            folder_watcher: None,
            menus: RenderedMenus::new(),
            last_error: None,
            entry_count: None,
            #[cfg(target_os = "windows")]
            anchor: None,
        }
    }

    fn handle(&mut self, event: UserEvent, event_loop: &ActiveEventLoop) {
        match event {
            UserEvent::TrayActivated(activation) => self.on_activation(activation),
            UserEvent::MenuAction(action) => self.on_menu_action(action),
            UserEvent::FolderChanged => self.refresh_snapshot(),
            UserEvent::ConfigReloaded(config) => self.apply_config(config),
            UserEvent::ConfigReloadFailed(message) => {
                warn!("{}", message);
                self.last_error = Some(message);
                self.update_tooltip();
            }
            UserEvent::QuitRequested => {
                info!("Quit requested");
                event_loop.exit();
            }
        }
    }

    fn on_activation(&mut self, activation: Activation) {
        match self.machine.on_activation(activation) {
            TrayEffect::ShowMenu { model, position } => {
                self.last_error = None;
                self.entry_count = Some(model.entry_count());
                self.sync_icon();
                self.update_tooltip();
                let rendered = {
                    let (generation, model) = self.menus.insert(model);
                    render_menu(model, generation)
                };
                match rendered {
                    Ok(menu) => {
                        if self.present_menu(menu, position) {
                            self.machine.on_menu_closed_externally();
                        }
                    }
                    Err(err) => {
                        error!("Failed to render menu: {:#}", err);
                        self.machine.on_menu_closed_externally();
                    }
                }
                self.sync_icon();
            }
            TrayEffect::HideMenu => {
                self.tray_icon.set_menu(None);
                self.sync_icon();
            }
            TrayEffect::BuildFailed(err) => {
                error!("Failed to build menu: {}", err);
                self.last_error = Some(err.to_string());
                self.entry_count = None;
                self.sync_icon();
                self.update_tooltip();
            }
            TrayEffect::None => {}
        }
    }

    fn on_menu_action(&mut self, action: MenuAction) {
        match self.menus.activation(&action) {
            Some(activation) => dispatch_activation(&activation, &self.opener, &self.controller),
            None => warn!("Menu item {:?} is no longer available", action),
        }
    }

    /// Returns true once the menu is no longer on screen.
    #[cfg(target_os = "windows")]
    fn present_menu(&mut self, menu: Menu, position: MenuPosition) -> bool {
        use tray_icon::menu::ContextMenu;
        use tray_icon::menu::dpi::{PhysicalPosition, Position};
        use windows::Win32::Foundation::HWND;
        use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

        let Some(hwnd) = self.anchor.as_ref().and_then(window_hwnd) else {
            warn!("No anchor window; cannot show the menu");
            return true;
        };
        let at = Position::Physical(PhysicalPosition::new(
            position.x.round() as i32,
            position.y.round() as i32,
        ));
        // SAFETY: `hwnd` belongs to the hidden anchor window, which lives as
        // long as the event loop. The popup must be owned by the foreground
        // window or it will not close on an outside click.
        unsafe {
            let _ = SetForegroundWindow(HWND(hwnd as *mut _));
            let _ = menu.show_context_menu_for_hwnd(hwnd, Some(at));
        }
        // The popup is modal: once it returns it was dismissed or an item chosen
        true
    }

    /// The toolkit shows the attached menu itself on click.
    #[cfg(target_os = "macos")]
    fn present_menu(&mut self, menu: Menu, _position: MenuPosition) -> bool {
        self.tray_icon.set_menu(Some(Box::new(menu)));
        true
    }

    #[cfg(target_os = "windows")]
    fn init_anchor(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = winit::window::Window::default_attributes()
            .with_title(self.config.menu.title.clone())
            .with_visible(false)
            .with_decorations(false);
        match event_loop.create_window(attributes) {
            Ok(window) => self.anchor = Some(window),
            Err(err) => error!("Failed to create menu anchor window: {}", err),
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn init_anchor(&mut self, _event_loop: &ActiveEventLoop) {}

    /// Rebuild outside of an activation, to keep the tooltip (and on macOS
    /// the attached menu) in line with the folder.
    fn refresh_snapshot(&mut self) {
        match self.machine.preview() {
            Ok(model) => {
                self.entry_count = Some(model.entry_count());
                self.last_error = None;
                #[cfg(target_os = "macos")]
                {
                    let (generation, model) = self.menus.insert(model);
                    match render_menu(model, generation) {
                        Ok(menu) => self.tray_icon.set_menu(Some(Box::new(menu))),
                        Err(err) => error!("Failed to render menu: {:#}", err),
                    }
                }
            }
            Err(err) => {
                warn!("{}", err);
                self.entry_count = None;
                self.last_error = Some(err.to_string());
            }
        }
        self.update_tooltip();
    }

    fn apply_config(&mut self, config: Config) {
        if config == self.config {
            debug!("Config file touched but unchanged");
            self.refresh_snapshot();
            return;
        }
        let folder = match config.resolve_folder(self.folder_override.as_deref()) {
            Ok(folder) => folder,
            Err(err) => {
                warn!("Ignoring reloaded config: {:#}", err);
                self.last_error = Some(format!("{:#}", err));
                self.update_tooltip();
                return;
            }
        };

        let builder = self.machine.builder_mut();
        builder.set_title(config.menu.title.clone());
        builder.set_strip_file_extensions(config.menu.strip_file_extensions);
        self.machine.set_metrics(config.menu.metrics);

        let folder_changed = folder.as_path() != self.machine.folder();
        let watch_changed = config.folder.watch != self.config.folder.watch;
        self.machine.set_folder(folder);
        self.config = config;
        if folder_changed || watch_changed {
            self.rewatch_folder();
        }

        info!("Configuration reloaded; showing {}", self.machine.folder().display());
        self.refresh_snapshot();
    }

    fn rewatch_folder(&mut self) {
        self.folder_watcher = None;
        if !self.config.folder.watch {
            return;
        }

        let proxy = self.proxy.clone();
        let folder = self.machine.folder().to_path_buf();
        let on_change = move |_: &Path| {
            let _ = proxy.send_event(UserEvent::FolderChanged);
        };
        let watcher =
            PathWatcher::spawn(&folder, RecursiveMode::NonRecursive, DEFAULT_DEBOUNCE, on_change);
        match watcher {
            Ok(watcher) => self.folder_watcher = Some(watcher),
            Err(err) => warn!("Failed to watch {}: {}", folder.display(), err),
        }
    }

    fn sync_icon(&self) {
        match create_tray_icon(self.machine.state().icon_state) {
            Ok(icon) => {
                if let Err(err) = self.tray_icon.set_icon(Some(icon)) {
                    error!("Failed to update tray icon: {}", err);
                }
            }
            Err(err) => error!("Failed to load tray icon: {:#}", err),
        }
    }

    fn update_tooltip(&self) {
        let tooltip = build_tooltip(
            &self.config.menu.title,
            self.machine.folder(),
            self.entry_count,
            self.last_error.as_deref(),
        );
        if let Err(err) = self.tray_icon.set_tooltip(Some(tooltip.as_str())) {
            error!("Failed to update tooltip: {}", err);
        }
    }

    fn shutdown(&mut self) {
        debug!("Shutting down");
        self.folder_watcher = None;
        self.opener.shutdown();
    }
}

fn spawn_config_watcher(
    config_path: &Path,
    proxy: EventLoopProxy<UserEvent>,
) -> Option<PathWatcher> {
    let result = PathWatcher::spawn(
        config_path,
        RecursiveMode::NonRecursive,
        DEFAULT_DEBOUNCE,
        move |path| {
            debug!("Config file changed, attempting reload");
            let event = match load_and_validate_config(path) {
                Ok(config) => UserEvent::ConfigReloaded(config),
                Err(err) => {
                    UserEvent::ConfigReloadFailed(format!("Config reload failed: {:#}", err))
                }
            };
            let _ = proxy.send_event(event);
        },
    );
    match result {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            error!("Failed to watch config file: {}", err);
            None
        }
    }
}

fn activation_from_event(event: &TrayIconEvent) -> Option<Activation> {
    match event {
        TrayIconEvent::Click {
            rect,
            button,
            button_state: MouseButtonState::Up,
            ..
        } => {
            let reason = match button {
                MouseButton::Left => ActivationReason::Trigger,
                MouseButton::Right => ActivationReason::Context,
                _ => ActivationReason::Other,
            };
            Some(Activation {
                reason,
                geometry: geometry_from_rect(rect),
            })
        }
        TrayIconEvent::DoubleClick { rect, .. } => Some(Activation {
            reason: ActivationReason::DoubleClick,
            geometry: geometry_from_rect(rect),
        }),
        _ => None,
    }
}

fn geometry_from_rect(rect: &tray_icon::Rect) -> IconGeometry {
    IconGeometry {
        x: rect.position.x,
        y: rect.position.y,
        width: f64::from(rect.size.width),
        height: f64::from(rect.size.height),
    }
}

#[cfg(target_os = "windows")]
fn window_hwnd(window: &winit::window::Window) -> Option<isize> {
    use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};

    match window.window_handle().ok()?.as_raw() {
        RawWindowHandle::Win32(handle) => Some(handle.hwnd.get()),
        _ => None,
    }
}
