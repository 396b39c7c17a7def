//! Tray icon / menu visibility state.
//!
//! The toolkit cannot reliably say whether the popup is still on screen
//! once it can be dismissed from outside, so this machine is the single
//! place the rest of the app asks.

use std::path::{Path, PathBuf};

use crate::config::MenuMetrics;
use crate::error::MenuBuildError;
use crate::menu_model::MenuModelBuilder;
use crate::model::{Activation, ActivationReason, MenuModel, MenuPosition};
use crate::shortcut::ShortcutReader;
use crate::ui::menu::{estimate_menu_height, popup_position};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IconState {
    #[default]
    Idle,
    Open,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TrayState {
    pub icon_state: IconState,
    pub menu_visible: bool,
}

impl TrayState {
    pub const IDLE: TrayState = TrayState {
        icon_state: IconState::Idle,
        menu_visible: false,
    };
    pub const OPEN: TrayState = TrayState {
        icon_state: IconState::Open,
        menu_visible: true,
    };
}

/// Side effect the toolkit layer has to carry out after a transition.
#[derive(Debug)]
pub enum TrayEffect {
    ShowMenu {
        model: MenuModel,
        position: MenuPosition,
    },
    HideMenu,
    /// The folder could not be listed; the menu stays closed.
    BuildFailed(MenuBuildError),
    /// Nothing changed.
    None,
}

pub struct TrayStateMachine<R> {
    state: TrayState,
    builder: MenuModelBuilder<R>,
    folder: PathBuf,
    metrics: MenuMetrics,
}

impl<R: ShortcutReader> TrayStateMachine<R> {
    pub fn new(
        builder: MenuModelBuilder<R>,
        folder: impl Into<PathBuf>,
        metrics: MenuMetrics,
    ) -> Self {
        Self {
            state: TrayState::IDLE,
            builder,
            folder: folder.into(),
            metrics,
        }
    }

    pub fn state(&self) -> TrayState {
        self.state
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn builder_mut(&mut self) -> &mut MenuModelBuilder<R> {
        &mut self.builder
    }

    pub fn set_folder(&mut self, folder: impl Into<PathBuf>) {
        self.folder = folder.into();
    }

    pub fn set_metrics(&mut self, metrics: MenuMetrics) {
        self.metrics = metrics;
    }

    /// Build the model without touching the state, e.g. for a menu that
    /// the toolkit keeps attached to the icon.
    pub fn preview(&self) -> Result<MenuModel, MenuBuildError> {
        self.builder.build(&self.folder)
    }

    pub fn on_activation(&mut self, activation: Activation) -> TrayEffect {
        if activation.reason != ActivationReason::Trigger {
            return TrayEffect::None;
        }

        if self.state.menu_visible {
            self.state = TrayState::IDLE;
            return TrayEffect::HideMenu;
        }

        match self.builder.build(&self.folder) {
            Ok(model) => {
                let height = estimate_menu_height(&model, &self.metrics);
                let position = popup_position(&activation.geometry, height);
                self.state = TrayState::OPEN;
                TrayEffect::ShowMenu { model, position }
            }
            Err(err) => {
                self.state = TrayState::IDLE;
                TrayEffect::BuildFailed(err)
            }
        }
    }

    /// The menu went away without a toggle (outside click, Escape, item
    /// chosen). Always lands in the idle state.
    pub fn on_menu_closed_externally(&mut self) {
        self.state = TrayState::IDLE;
    }
}
