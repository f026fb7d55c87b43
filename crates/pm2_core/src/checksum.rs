use crate::buffer::SaveBuffer;
use crate::version::FileVersion;

/// Width of the stored checksum field, in bytes.
pub const CHECKSUM_WIDTH: usize = 4;

/// Constant written for every variant whose real checksum routine is
/// unknown. Files saved on this path carry a value the game itself would
/// never produce; a known limitation of the degraded path, not an error.
pub const PARTIAL_CHECKSUM: u32 = 0;

/// Compute the 32-bit integrity checksum for a save image.
///
/// Pure function of the buffer content and the file version. English
/// Refine dispatches to the full algorithm; every other variant returns
/// [`PARTIAL_CHECKSUM`].
pub fn compute(buffer: &SaveBuffer, version: FileVersion) -> u32 {
    if version.has_full_checksum() {
        full_checksum(buffer.as_bytes(), version.checksum_offset())
    } else {
        PARTIAL_CHECKSUM
    }
}

/// Stand-in for the game's native English Refine checksum routine.
///
/// The routine the retail engine uses was never ported out of its binary.
/// This digest is deterministic and sensitive to every byte outside the
/// checksum field itself, but it is NOT bit-compatible with saves written
/// by the game. It is isolated here so a verified port can replace the
/// body without touching anything else.
fn full_checksum(bytes: &[u8], checksum_offset: usize) -> u32 {
    let field = checksum_offset..checksum_offset + CHECKSUM_WIDTH;
    let mut digest: u32 = 5381;
    for (index, &byte) in bytes.iter().enumerate() {
        if field.contains(&index) {
            continue;
        }
        digest = digest.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    digest
}
