//! Shortcut files are a Windows shell concept; elsewhere every `.lnk`
//! resolves to nothing and shows up as a broken shortcut.

use std::path::{Path, PathBuf};

use crate::error::LinkResolutionError;
use crate::shortcut::ShortcutReader;

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemShortcutReader;

impl SystemShortcutReader {
    pub fn new() -> Self {
        Self
    }
}

impl ShortcutReader for SystemShortcutReader {
    fn read_target(&self, _link: &Path) -> Result<PathBuf, LinkResolutionError> {
        Err(LinkResolutionError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::LinkResolver;

    #[test]
    fn every_link_is_unresolved() {
        let resolver = LinkResolver::new(SystemShortcutReader::new());
        assert!(resolver.resolve(Path::new("/tmp/Docs.lnk")).path().is_none());
        assert!(resolver.is_broken(Path::new("/tmp/Docs.lnk")));
    }
}
