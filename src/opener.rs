//! Opening menu items and quitting, the two things a click can do.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::Sender;
use log::{error, info};

use crate::error::OpenError;
use crate::model::MenuActivation;

/// Launches a path with its default handler. Fire-and-forget.
pub trait ItemOpener {
    fn open(&self, path: &Path);
}

/// Lets the menu end the application without reaching for a global.
pub trait ApplicationController {
    fn quit(&self);
}

/// Route a clicked item to the matching collaborator.
pub fn dispatch_activation(
    activation: &MenuActivation,
    opener: &dyn ItemOpener,
    controller: &dyn ApplicationController,
) {
    match activation {
        MenuActivation::Open(path) => opener.open(path),
        MenuActivation::Quit => controller.quit(),
        MenuActivation::None => {}
    }
}

pub fn open_path(path: &Path) -> Result<(), OpenError> {
    open::that(path).map_err(|source| OpenError::Launch {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens items on a background worker so a slow shell handler never
/// blocks the event loop. Failures are logged and dropped.
pub struct ShellOpener {
    sender: Option<Sender<PathBuf>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ShellOpener {
    pub fn spawn() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<PathBuf>();
        let worker = thread::spawn(move || {
            for path in rx.iter() {
                match open_path(&path) {
                    Ok(()) => info!("Opened {}", path.display()),
                    Err(err) => error!("Error in open_item: {}", err),
                }
            }
        });
        Self {
            sender: Some(tx),
            worker: Some(worker),
        }
    }

    fn try_open(&self, path: &Path) -> Result<(), OpenError> {
        let sender = self.sender.as_ref().ok_or(OpenError::WorkerGone)?;
        sender
            .send(path.to_path_buf())
            .map_err(|_| OpenError::WorkerGone)
    }

    /// Stop accepting requests and wait for pending ones.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("Open worker panicked");
        }
    }
}

impl ItemOpener for ShellOpener {
    fn open(&self, path: &Path) {
        if let Err(err) = self.try_open(path) {
            error!("Error in open_item for {}: {}", path.display(), err);
        }
    }
}

impl Drop for ShellOpener {
    fn drop(&mut self) {
        self.shutdown();
    }
}
