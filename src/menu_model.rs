use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::EntryClassifier;
use crate::error::MenuBuildError;
use crate::model::{DirectoryEntry, MenuActivation, MenuItemModel, MenuModel};
use crate::shortcut::{LinkResolver, ShortcutReader, is_shortcut_path};

/// Builds the tray menu model from a folder listing.
#[derive(Clone, Debug)]
pub struct MenuModelBuilder<R> {
    classifier: EntryClassifier<R>,
    title: String,
    strip_file_extensions: bool,
}

impl<R: ShortcutReader> MenuModelBuilder<R> {
    pub fn new(reader: R, title: impl Into<String>) -> Self {
        Self {
            classifier: EntryClassifier::new(LinkResolver::new(reader)),
            title: title.into(),
            strip_file_extensions: true,
        }
    }

    pub fn with_strip_file_extensions(mut self, strip: bool) -> Self {
        self.strip_file_extensions = strip;
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_strip_file_extensions(&mut self, strip: bool) {
        self.strip_file_extensions = strip;
    }

    /// Title, one item per entry in listing order, then Quit.
    pub fn build(&self, folder: &Path) -> Result<MenuModel, MenuBuildError> {
        let entries = read_entries(folder, self.strip_file_extensions)?;

        let mut items = Vec::with_capacity(entries.len() + 2);
        items.push(MenuItemModel::title(self.title.clone()));
        for entry in &entries {
            let category = self.classifier.classify(entry);
            items.push(MenuItemModel::entry(entry, category));
        }
        items.push(MenuItemModel::quit());

        log::debug!(
            "Built menu for {} with {} entries",
            folder.display(),
            entries.len()
        );
        Ok(MenuModel { items })
    }
}

/// Snapshot of the folder, non-recursive and unfiltered. Any listing error
/// fails the whole snapshot.
pub fn read_entries(
    folder: &Path,
    strip_file_extensions: bool,
) -> Result<Vec<DirectoryEntry>, MenuBuildError> {
    let unavailable = |source| MenuBuildError::DirectoryUnavailable {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(folder).map_err(unavailable)? {
        let dir_entry = dir_entry.map_err(unavailable)?;
        let path = dir_entry.path();
        let is_shortcut = is_shortcut_path(&path);
        let strip = is_shortcut || strip_file_extensions;
        entries.push(DirectoryEntry {
            name: display_name(&path, strip),
            path,
            is_shortcut,
        });
    }
    Ok(entries)
}

pub fn display_name(path: &Path, strip_extension: bool) -> String {
    let name = if strip_extension {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Paths of the entry items, in menu order.
pub fn entry_paths(model: &MenuModel) -> Vec<PathBuf> {
    model
        .items
        .iter()
        .filter_map(|item| match &item.on_activate {
            MenuActivation::Open(path) => Some(path.clone()),
            _ => None,
        })
        .collect()
}
