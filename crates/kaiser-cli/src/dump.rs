use kaiser_driver::DebugSnapshot;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CRAM_DUMP: &str = "cram.bin";
pub const VRAM_DUMP: &str = "vram.bin";

/// Writes the raw CRAM and VRAM buffers of `snapshot` into `dir`,
/// overwriting earlier dumps.
pub fn write_memory_dumps(dir: &Path, snapshot: &DebugSnapshot) -> io::Result<[PathBuf; 2]> {
    fs::create_dir_all(dir)?;

    let cram = dir.join(CRAM_DUMP);
    fs::write(&cram, &snapshot.cram_raw)?;
    let vram = dir.join(VRAM_DUMP);
    fs::write(&vram, &snapshot.vram_raw)?;

    info!("Memory dumped to {}", dir.display());
    Ok([cram, vram])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_raw_buffers_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dumps");
        let mut snap = DebugSnapshot::default();
        snap.cram_raw[3] = 0xEE;
        snap.vram_raw[0xFFFF] = 0x42;

        let [cram, vram] = write_memory_dumps(&out, &snap).unwrap();
        assert_eq!(fs::read(cram).unwrap(), snap.cram_raw);
        let vram = fs::read(vram).unwrap();
        assert_eq!(vram.len(), 0x10000);
        assert_eq!(vram[0xFFFF], 0x42);
    }
}
