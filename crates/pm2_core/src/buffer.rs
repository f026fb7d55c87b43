use crate::core_api::{CoreError, CoreErrorCode};

/// Exact size of every Princess Maker 2 save file, in bytes.
pub const SAVE_FILE_SIZE: usize = 8192;

/// Fixed-size in-memory image of a save file.
///
/// The buffer is the single source of truth for every stat value: field
/// accessors decode from and encode into it on each access and hold no
/// state of their own. The length never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveBuffer {
    bytes: Box<[u8; SAVE_FILE_SIZE]>,
}

impl SaveBuffer {
    /// Adopt a raw save image. Anything other than exactly
    /// [`SAVE_FILE_SIZE`] bytes is rejected with `SizeMismatch`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != SAVE_FILE_SIZE {
            return Err(CoreError::new(
                CoreErrorCode::SizeMismatch,
                format!(
                    "expected a {SAVE_FILE_SIZE}-byte save image, got {} bytes",
                    bytes.len()
                ),
            ));
        }
        let mut image = Box::new([0u8; SAVE_FILE_SIZE]);
        image.copy_from_slice(bytes);
        Ok(Self { bytes: image })
    }

    pub fn len(&self) -> usize {
        SAVE_FILE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Copy `size` bytes out of the image starting at `offset`.
    pub fn read_at(&self, offset: usize, size: usize) -> Result<Vec<u8>, CoreError> {
        self.check_range(offset, size)?;
        Ok(self.bytes[offset..offset + size].to_vec())
    }

    /// Overwrite `size` bytes of the image at `offset` with the leading
    /// bytes of `data`. Supplying fewer than `size` bytes fails with
    /// `LengthMismatch`; bytes past `size` are ignored.
    pub fn write_at(&mut self, offset: usize, size: usize, data: &[u8]) -> Result<(), CoreError> {
        self.check_range(offset, size)?;
        if data.len() < size {
            return Err(CoreError::new(
                CoreErrorCode::LengthMismatch,
                format!("write of {size} bytes supplied only {}", data.len()),
            ));
        }
        self.bytes[offset..offset + size].copy_from_slice(&data[..size]);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    fn check_range(&self, offset: usize, size: usize) -> Result<(), CoreError> {
        let in_bounds = offset
            .checked_add(size)
            .is_some_and(|end| end <= SAVE_FILE_SIZE);
        if !in_bounds {
            return Err(CoreError::new(
                CoreErrorCode::OutOfBounds,
                format!("range {offset}+{size} exceeds the {SAVE_FILE_SIZE}-byte save image"),
            ));
        }
        Ok(())
    }
}
