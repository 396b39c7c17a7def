use std::path::Path;
use std::thread;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

/// How long a path has to stay quiet before its change is reported.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches one path and calls `on_change` from a background thread once
/// a burst of changes has settled. Dropping the watcher stops the thread.
pub struct PathWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    _thread: thread::JoinHandle<()>,
}

impl PathWatcher {
    pub fn spawn<F>(
        path: &Path,
        mode: RecursiveMode,
        debounce: Duration,
        on_change: F,
    ) -> notify::Result<Self>
    where
        F: Fn(&Path) + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| {
            let _ = tx.send(res);
        })?;
        debouncer.watcher().watch(path, mode)?;

        let watched = path.to_path_buf();
        let thread = thread::spawn(move || {
            // Ends when the debouncer, and with it the sender, is dropped
            for result in rx.iter() {
                match result {
                    Ok(events) if !events.is_empty() => {
                        log::debug!(
                            "{} change(s) settled under {}",
                            events.len(),
                            watched.display()
                        );
                        on_change(&watched);
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("Watch error on {}: {}", watched.display(), e),
                }
            }
            log::debug!("Watcher for {} stopped", watched.display());
        });

        log::debug!("Watching {:?}", path);
        Ok(Self {
            _debouncer: debouncer,
            _thread: thread,
        })
    }
}
