use std::path::Path;

use log::info;

use crate::model::{DirectoryEntry, EntryCategory, ResolvedTarget};
use crate::shortcut::{LinkResolver, ShortcutReader};

/// Category of a shortcut given its resolved target.
pub fn category_for_target(target: &ResolvedTarget) -> EntryCategory {
    if !target.exists() {
        EntryCategory::BrokenShortcut
    } else if target.is_directory() {
        EntryCategory::ShortcutToDirectory
    } else {
        EntryCategory::ShortcutToFile
    }
}

/// Classifies folder entries. Nothing is cached: every call looks at the
/// filesystem as it is now.
#[derive(Clone, Debug, Default)]
pub struct EntryClassifier<R> {
    resolver: LinkResolver<R>,
}

impl<R: ShortcutReader> EntryClassifier<R> {
    pub fn new(resolver: LinkResolver<R>) -> Self {
        Self { resolver }
    }

    pub fn classify(&self, entry: &DirectoryEntry) -> EntryCategory {
        if !entry.is_shortcut {
            return plain_category(&entry.path);
        }

        let target = self.resolver.resolve(&entry.path);
        let category = category_for_target(&target);
        match category {
            EntryCategory::ShortcutToDirectory => {
                info!("link shortcut directory : {}", entry.path.display())
            }
            EntryCategory::ShortcutToFile => {
                info!("link shortcut file : {}", entry.path.display())
            }
            _ => info!("broken link shortcut : {}", entry.path.display()),
        }
        category
    }
}

fn plain_category(path: &Path) -> EntryCategory {
    if path.is_dir() {
        EntryCategory::PlainDirectory
    } else {
        EntryCategory::PlainFile
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::shortcut::tests::MapReader;

    fn entry(path: PathBuf, is_shortcut: bool) -> DirectoryEntry {
        DirectoryEntry {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path,
            is_shortcut,
        }
    }

    #[test]
    fn plain_entries_ignore_the_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        let sub = dir.path().join("Projects");
        fs::write(&file, b"hi").unwrap();
        fs::create_dir(&sub).unwrap();

        // A reader that would claim both are links must not be consulted.
        let reader = MapReader::default()
            .with(&file, dir.path())
            .with(&sub, &file);
        let classifier = EntryClassifier::new(LinkResolver::new(reader));

        assert_eq!(
            classifier.classify(&entry(file, false)),
            EntryCategory::PlainFile
        );
        assert_eq!(
            classifier.classify(&entry(sub, false)),
            EntryCategory::PlainDirectory
        );
    }

    #[test]
    fn shortcut_categories_follow_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let target_dir = dir.path().join("Documents");
        let target_file = dir.path().join("game.exe");
        fs::create_dir(&target_dir).unwrap();
        fs::write(&target_file, b"MZ").unwrap();

        let docs = dir.path().join("Docs.lnk");
        let game = dir.path().join("Game.lnk");
        let old = dir.path().join("Old.lnk");
        let junk = dir.path().join("Junk.lnk");
        let reader = MapReader::default()
            .with(&docs, &target_dir)
            .with(&game, &target_file)
            .with(&old, dir.path().join("deleted"));
        let classifier = EntryClassifier::new(LinkResolver::new(reader));

        assert_eq!(
            classifier.classify(&entry(docs, true)),
            EntryCategory::ShortcutToDirectory
        );
        assert_eq!(
            classifier.classify(&entry(game, true)),
            EntryCategory::ShortcutToFile
        );
        assert_eq!(
            classifier.classify(&entry(old, true)),
            EntryCategory::BrokenShortcut
        );
        assert_eq!(
            classifier.classify(&entry(junk, true)),
            EntryCategory::BrokenShortcut
        );
    }

    #[test]
    fn reclassifies_after_target_changes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Music");
        let link = dir.path().join("Music.lnk");
        let classifier =
            EntryClassifier::new(LinkResolver::new(MapReader::default().with(&link, &target)));
        let link_entry = entry(link, true);

        assert_eq!(
            classifier.classify(&link_entry),
            EntryCategory::BrokenShortcut
        );
        fs::create_dir(&target).unwrap();
        assert_eq!(
            classifier.classify(&link_entry),
            EntryCategory::ShortcutToDirectory
        );
    }

    #[test]
    fn absent_target_maps_to_broken() {
        assert_eq!(
            category_for_target(&ResolvedTarget::absent()),
            EntryCategory::BrokenShortcut
        );
    }
}
