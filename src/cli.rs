use std::path::PathBuf;

use clap::Parser;

/// Show a folder's contents as a tray popup menu.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tray-folder", version, about)]
pub struct Cli {
    /// Folder to show, overriding `folder.path` from the config file
    #[arg(short, long, value_name = "PATH")]
    pub folder: Option<PathBuf>,

    /// Config file to use instead of ~/.tray-folder.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["tray-folder", "--folder", "/links", "-c", "/tmp/c.json"]);
        assert_eq!(cli.folder, Some(PathBuf::from("/links")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn no_arguments_is_fine() {
        let cli = Cli::parse_from(["tray-folder"]);
        assert!(cli.folder.is_none());
        assert!(cli.config.is_none());
    }
}
