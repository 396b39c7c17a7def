//! Shortcut (`.lnk`) resolution.
//!
//! Platform readers may fail in many ways; [`LinkResolver`] turns every
//! failure into an absent target so that callers never see an error.

use std::path::{Path, PathBuf};

use crate::error::LinkResolutionError;
use crate::model::ResolvedTarget;

pub const SHORTCUT_EXTENSION: &str = "lnk";

/// True for file names ending in `.lnk` (case-insensitive), including a
/// bare `.lnk`.
pub fn is_shortcut_path(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.as_encoded_bytes();
    let suffix_len = SHORTCUT_EXTENSION.len() + 1;
    name.len() >= suffix_len && {
        let (dot, ext) = name[name.len() - suffix_len..].split_at(1);
        dot == b"." && ext.eq_ignore_ascii_case(SHORTCUT_EXTENSION.as_bytes())
    }
}

/// Platform facility that reads the target stored in a shortcut file.
pub trait ShortcutReader {
    fn read_target(&self, link: &Path) -> Result<PathBuf, LinkResolutionError>;
}

impl<T: ShortcutReader + ?Sized> ShortcutReader for &T {
    fn read_target(&self, link: &Path) -> Result<PathBuf, LinkResolutionError> {
        (**self).read_target(link)
    }
}

#[derive(Clone, Debug, Default)]
pub struct LinkResolver<R> {
    reader: R,
}

impl<R: ShortcutReader> LinkResolver<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn resolve(&self, link: &Path) -> ResolvedTarget {
        match self.reader.read_target(link) {
            Ok(target) if target.as_os_str().is_empty() => {
                log::debug!("Shortcut {} resolved to an empty target", link.display());
                ResolvedTarget::absent()
            }
            Ok(target) => ResolvedTarget::to(target),
            Err(err) => {
                log::debug!("Could not resolve {}: {}", link.display(), err);
                ResolvedTarget::absent()
            }
        }
    }

    pub fn is_broken(&self, link: &Path) -> bool {
        !self.resolve(link).exists()
    }

    /// False for unresolvable links instead of probing a placeholder path.
    pub fn points_to_directory(&self, link: &Path) -> bool {
        self.resolve(link).is_directory()
    }
}
