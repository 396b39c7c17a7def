use std::path::{Path, PathBuf};

use crate::config::Config;

/// One entry of the watched folder, captured when the menu is built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectoryEntry {
    /// Display name (extension already stripped where it applies).
    pub name: String,
    pub path: PathBuf,
    pub is_shortcut: bool,
}

/// Target of a shortcut; `None` when the link could not be resolved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedTarget {
    pub target_path: Option<PathBuf>,
}

impl ResolvedTarget {
    pub fn absent() -> Self {
        Self { target_path: None }
    }

    pub fn to(path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.target_path.as_deref()
    }

    /// True when resolution succeeded and the target is on disk right now.
    pub fn exists(&self) -> bool {
        self.path().is_some_and(Path::exists)
    }

    /// An absent target is never a directory.
    pub fn is_directory(&self) -> bool {
        self.path().is_some_and(Path::is_dir)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntryCategory {
    PlainFile,
    PlainDirectory,
    ShortcutToDirectory,
    ShortcutToFile,
    BrokenShortcut,
}

impl EntryCategory {
    pub fn icon_key(self) -> IconKey {
        match self {
            EntryCategory::PlainDirectory | EntryCategory::ShortcutToDirectory => IconKey::Folder,
            EntryCategory::PlainFile | EntryCategory::ShortcutToFile => IconKey::Circle,
            EntryCategory::BrokenShortcut => IconKey::Broken,
        }
    }
}

/// Menu icons shipped with the application.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum IconKey {
    Folder,
    Circle,
    Broken,
    Exit,
}

impl IconKey {
    pub fn as_str(self) -> &'static str {
        match self {
            IconKey::Folder => "folder",
            IconKey::Circle => "circle",
            IconKey::Broken => "broken",
            IconKey::Exit => "exit",
        }
    }
}

/// What happens when a menu item is clicked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MenuActivation {
    /// Title item; not interactive.
    None,
    Open(PathBuf),
    Quit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MenuItemModel {
    pub label: String,
    pub icon_key: Option<IconKey>,
    pub tooltip: Option<String>,
    pub category: Option<EntryCategory>,
    pub on_activate: MenuActivation,
}

impl MenuItemModel {
    pub fn title(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon_key: None,
            tooltip: None,
            category: None,
            on_activate: MenuActivation::None,
        }
    }

    pub fn entry(entry: &DirectoryEntry, category: EntryCategory) -> Self {
        Self {
            label: entry.name.clone(),
            icon_key: Some(category.icon_key()),
            tooltip: Some(format!("Open {}", entry.name)),
            category: Some(category),
            on_activate: MenuActivation::Open(entry.path.clone()),
        }
    }

    pub fn quit() -> Self {
        Self {
            label: "Quit".to_string(),
            icon_key: Some(IconKey::Exit),
            tooltip: Some("Close the application".to_string()),
            category: None,
            on_activate: MenuActivation::Quit,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.on_activate != MenuActivation::None
    }
}

/// Ordered menu: title, one item per folder entry, quit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MenuModel {
    pub items: Vec<MenuItemModel>,
}

impl MenuModel {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MenuItemModel> {
        self.items.get(index)
    }

    /// Items that stand for folder entries (title and quit excluded).
    pub fn entries(&self) -> impl Iterator<Item = &MenuItemModel> {
        self.items.iter().filter(|item| item.category.is_some())
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }
}

/// Screen rectangle of the tray icon in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IconGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Top-left corner of a popup menu in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MenuPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActivationReason {
    /// Primary click on the tray icon.
    Trigger,
    Context,
    DoubleClick,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Activation {
    pub reason: ActivationReason,
    pub geometry: IconGeometry,
}

#[derive(Clone, Debug)]
pub enum UserEvent {
    TrayActivated(Activation),
    MenuAction(MenuAction),
    FolderChanged,
    ConfigReloaded(Config),
    ConfigReloadFailed(String),
    QuitRequested,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MenuAction {
    /// Item `index` of the model rendered as menu `generation`.
    Activate { generation: u64, index: usize },
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_table_matches_categories() {
        assert_eq!(EntryCategory::PlainDirectory.icon_key(), IconKey::Folder);
        assert_eq!(EntryCategory::ShortcutToDirectory.icon_key(), IconKey::Folder);
        assert_eq!(EntryCategory::PlainFile.icon_key(), IconKey::Circle);
        assert_eq!(EntryCategory::ShortcutToFile.icon_key(), IconKey::Circle);
        assert_eq!(EntryCategory::BrokenShortcut.icon_key(), IconKey::Broken);
    }

    #[test]
    fn absent_target_is_neither_present_nor_directory() {
        let target = ResolvedTarget::absent();
        assert!(!target.exists());
        assert!(!target.is_directory());
    }

    #[test]
    fn title_is_the_only_disabled_item() {
        let entry = DirectoryEntry {
            name: "notes".into(),
            path: PathBuf::from("/tmp/notes.txt"),
            is_shortcut: false,
        };
        assert!(!MenuItemModel::title("Tray-Folder").is_enabled());
        assert!(MenuItemModel::entry(&entry, EntryCategory::PlainFile).is_enabled());
        assert!(MenuItemModel::quit().is_enabled());
    }

    #[test]
    fn entry_item_carries_label_tooltip_and_path() {
        let entry = DirectoryEntry {
            name: "Docs".into(),
            path: PathBuf::from("/tmp/Docs.lnk"),
            is_shortcut: true,
        };
        let item = MenuItemModel::entry(&entry, EntryCategory::ShortcutToDirectory);
        assert_eq!(item.label, "Docs");
        assert_eq!(item.tooltip.as_deref(), Some("Open Docs"));
        assert_eq!(item.icon_key, Some(IconKey::Folder));
        assert_eq!(
            item.on_activate,
            MenuActivation::Open(PathBuf::from("/tmp/Docs.lnk"))
        );
    }
}
