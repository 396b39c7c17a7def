use anyhow::{Result, anyhow};
use png::Decoder;

use crate::model::IconKey;
use crate::tray_state::IconState;

// Embedded at compile time so the binary runs from any working directory
static ICON_UP: &[u8] = include_bytes!("../../assets/up.png");
static ICON_UP_OPEN: &[u8] = include_bytes!("../../assets/up-open.png");
static ICON_FOLDER: &[u8] = include_bytes!("../../assets/folder.png");
static ICON_CIRCLE: &[u8] = include_bytes!("../../assets/circle.png");
static ICON_BROKEN: &[u8] = include_bytes!("../../assets/broken.png");
static ICON_EXIT: &[u8] = include_bytes!("../../assets/exit.png");

/// Decoded RGBA image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn tray_icon_png(state: IconState) -> &'static [u8] {
    match state {
        IconState::Idle => ICON_UP,
        IconState::Open => ICON_UP_OPEN,
    }
}

pub fn menu_icon_png(key: IconKey) -> &'static [u8] {
    match key {
        IconKey::Folder => ICON_FOLDER,
        IconKey::Circle => ICON_CIRCLE,
        IconKey::Broken => ICON_BROKEN,
        IconKey::Exit => ICON_EXIT,
    }
}

/// Tray icon for the given state: an arrow that fills in while the menu is open.
#[cfg(any(target_os = "windows", target_os = "macos"))]
pub fn create_tray_icon(state: IconState) -> Result<tray_icon::Icon> {
    let image = decode_png(tray_icon_png(state))?;
    tray_icon::Icon::from_rgba(image.rgba, image.width, image.height)
        .map_err(|e| anyhow!("failed to create icon: {e}"))
}

#[cfg(any(target_os = "windows", target_os = "macos"))]
pub fn create_menu_icon(key: IconKey) -> Result<tray_icon::menu::Icon> {
    let image = decode_png(menu_icon_png(key))?;
    tray_icon::menu::Icon::from_rgba(image.rgba, image.width, image.height)
        .map_err(|e| anyhow!("failed to create menu icon: {e}"))
}

pub fn decode_png(png_data: &[u8]) -> Result<RgbaImage> {
    let decoder = Decoder::new(png_data);
    let mut reader = decoder
        .read_info()
        .map_err(|e| anyhow!("failed to read PNG header: {e}"))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| anyhow!("failed to decode PNG: {e}"))?;

    let width = info.width;
    let height = info.height;
    let pixels = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(anyhow!("only 8-bit PNG icons are supported"));
    }

    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks(2) {
                rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for &gray in pixels {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
            rgba
        }
        png::ColorType::Indexed => {
            return Err(anyhow!("indexed PNG not supported for icons"));
        }
    };

    Ok(RgbaImage {
        rgba,
        width,
        height,
    })
}
