use std::fs;
use std::path::{Path, PathBuf};

use crate::adapter::MAX_ROM_SIZE;
use crate::error::LoadError;

/// Overseas title field of the cartridge header.
const HEADER_TITLE: std::ops::Range<usize> = 0x150..0x180;

/// An immutable cartridge image.
///
/// The bytes are handed to the core once at load time; afterwards the image
/// is only kept for size bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    data: Vec<u8>,
    declared_size: usize,
    path: Option<PathBuf>,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let declared_size = fs::metadata(path).map_err(io_err)?.len() as usize;
        let data = fs::read(path).map_err(io_err)?;

        let cart = Self {
            data,
            declared_size,
            path: Some(path.to_path_buf()),
        };
        cart.validate()?;
        Ok(cart)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LoadError> {
        let declared_size = data.len();
        Self::with_declared_size(data, declared_size)
    }

    /// Builds an image whose size was reported separately from its bytes
    /// (e.g. by a container directory entry).
    pub fn with_declared_size(data: Vec<u8>, declared_size: usize) -> Result<Self, LoadError> {
        let cart = Self {
            data,
            declared_size,
            path: None,
        };
        cart.validate()?;
        Ok(cart)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.data.is_empty() {
            return Err(LoadError::Empty);
        }
        if self.declared_size != self.data.len() {
            return Err(LoadError::SizeMismatch {
                declared: self.declared_size,
                actual: self.data.len(),
            });
        }
        if self.data.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: self.data.len(),
                max: MAX_ROM_SIZE,
            });
        }
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.declared_size
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Title from the header, trimmed. `None` for images too short to carry
    /// a header or with a blank title.
    pub fn title(&self) -> Option<String> {
        let raw = self.data.get(HEADER_TITLE)?;
        let title: String = raw
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
            .collect();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        (!title.is_empty()).then_some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_is_rejected() {
        assert!(matches!(
            Cartridge::from_bytes(Vec::new()),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn declared_size_must_match() {
        let err = Cartridge::with_declared_size(vec![0; 16], 32).unwrap_err();
        assert!(matches!(
            err,
            LoadError::SizeMismatch {
                declared: 32,
                actual: 16
            }
        ));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let err = Cartridge::from_bytes(vec![0; MAX_ROM_SIZE + 1]).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { .. }));
    }

    #[test]
    fn title_is_read_from_header() {
        let mut rom = vec![0u8; 0x200];
        rom[0x150..0x180].fill(b' ');
        rom[0x150..0x15B].copy_from_slice(b"SONIC  TEST");
        let cart = Cartridge::from_bytes(rom).unwrap();
        assert_eq!(cart.title().as_deref(), Some("SONIC TEST"));

        let short = Cartridge::from_bytes(vec![0; 0x100]).unwrap();
        assert_eq!(short.title(), None);
    }
}
