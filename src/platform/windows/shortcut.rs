//! `.lnk` resolution through the shell's `IShellLinkW` COM object.

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::{Path, PathBuf};

use windows::Win32::Foundation::MAX_PATH;
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
    CoUninitialize, IPersistFile, STGM_READ,
};
use windows::Win32::UI::Shell::{IShellLinkW, SLGP_UNCPRIORITY, ShellLink};
use windows::core::{HSTRING, Interface};

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
    fn read_target(&self, link: &Path) -> Result<PathBuf, LinkResolutionError> {
        let _com = ComApartment::enter();
        let target = read_shell_link(link).map_err(|e| LinkResolutionError::Facility {
            path: link.to_path_buf(),
            message: e.message().to_string(),
        })?;
        if target.as_os_str().is_empty() {
            return Err(LinkResolutionError::EmptyTarget(link.to_path_buf()));
        }
        Ok(target)
    }
}

/// Balances a successful `CoInitializeEx` on the current thread.
struct ComApartment {
    initialized: bool,
}

impl ComApartment {
    fn enter() -> Self {
        // SAFETY: no reserved pointer is passed; a thread already in another
        // apartment gets RPC_E_CHANGED_MODE and keeps its own COM state.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        Self {
            initialized: hr.is_ok(),
        }
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.initialized {
            // SAFETY: paired with the successful CoInitializeEx in `enter`.
            unsafe { CoUninitialize() };
        }
    }
}

fn read_shell_link(link: &Path) -> windows::core::Result<PathBuf> {
    // SAFETY: COM is initialized on this thread by the caller; the buffer
    // outlives the GetPath call and no find-data pointer is requested.
    unsafe {
        let shell_link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)?;
        let persist: IPersistFile = shell_link.cast()?;
        persist.Load(&HSTRING::from(link.as_os_str()), STGM_READ)?;

        let mut buf = [0u16; MAX_PATH as usize];
        shell_link.GetPath(&mut buf, std::ptr::null_mut(), SLGP_UNCPRIORITY.0 as u32)?;
        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(PathBuf::from(OsString::from_wide(&buf[..len])))
    }
}
