use kaiser_driver::adapter::{FRAME_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

const PREFIX: &str = "screenshot";
const SUFFIX: &str = ".png";

/// Next free `screenshotNNNN.png` in `dir`, one past the highest index
/// already present.
pub fn next_screenshot_path(dir: &Path) -> io::Result<PathBuf> {
    let mut max_index = 0u32;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_suffix(SUFFIX))
            .and_then(|digits| digits.parse::<u32>().ok());
        if let Some(index) = index {
            max_index = max_index.max(index);
        }
    }
    Ok(dir.join(format!("{PREFIX}{:04}{SUFFIX}", max_index + 1)))
}

/// Converts the core's RGB32 frame (little-endian `0xffRRGGBB`) to packed RGB.
fn rgb32_to_rgb(frame: &[u8]) -> Vec<u8> {
    frame
        .chunks_exact(4)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect()
}

pub fn save_screenshot(dir: &Path, frame: &[u8]) -> io::Result<PathBuf> {
    if frame.len() != FRAME_BUFFER_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame is {} bytes, expected {FRAME_BUFFER_SIZE}", frame.len()),
        ));
    }

    fs::create_dir_all(dir)?;
    let path = next_screenshot_path(dir)?;

    let file = File::create(&path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(io::Error::other)?;
    writer
        .write_image_data(&rgb32_to_rgb(frame))
        .map_err(io::Error::other)?;
    writer.finish().map_err(io::Error::other)?;

    info!("Screenshot saved to {}", path.display());
    Ok(path)
}
