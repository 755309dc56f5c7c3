use crate::{CpuError, Result};

/// Number of addressable cells.
pub const MEMORY_SIZE: usize = 256;

pub trait Memory {
    fn read_byte(&mut self, address: u16) -> Result<u8>;
    fn write_byte(&mut self, address: u16, data: u8) -> Result<()>;
}

/// Plain, zero-filled RAM covering the whole address space.
pub struct Ram {
    bytes: [u8; MEMORY_SIZE],
}

impl Ram {
    pub fn new() -> Ram {
        return Ram {
            bytes: [0; MEMORY_SIZE],
        };
    }

    /// Copy `image` into memory starting at address 0.
    pub fn load(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MEMORY_SIZE {
            return Err(CpuError::ProgramTooLarge {
                length: image.len(),
            });
        }
        self.bytes[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }
}

impl Default for Ram {
    fn default() -> Self {
        Ram::new()
    }
}

impl Memory for Ram {
    fn read_byte(&mut self, address: u16) -> Result<u8> {
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(CpuError::OutOfBounds { address })
    }
    fn write_byte(&mut self, address: u16, data: u8) -> Result<()> {
        let cell = self
            .bytes
            .get_mut(address as usize)
            .ok_or(CpuError::OutOfBounds { address })?;
        *cell = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let mut ram = Ram::new();
        for address in 0..MEMORY_SIZE as u16 {
            assert_eq!(ram.read_byte(address), Ok(0));
        }
    }

    #[test]
    fn write_then_read() {
        let mut ram = Ram::new();
        ram.write_byte(0xF3, 0x2A).unwrap();
        assert_eq!(ram.read_byte(0xF3), Ok(0x2A));
        assert_eq!(ram.read_byte(0xF4), Ok(0));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut ram = Ram::new();
        assert_eq!(
            ram.read_byte(0x100),
            Err(CpuError::OutOfBounds { address: 0x100 })
        );
        assert_eq!(
            ram.write_byte(0x101, 1),
            Err(CpuError::OutOfBounds { address: 0x101 })
        );
        assert_eq!(ram.as_bytes()[0xFF], 0);
    }

    #[test]
    fn load_places_image_at_zero() {
        let mut ram = Ram::new();
        ram.load(&[0x82, 0x00, 0x08]).unwrap();
        assert_eq!(&ram.as_bytes()[..4], &[0x82, 0x00, 0x08, 0x00]);
    }

    #[test]
    fn load_rejects_oversized_image() {
        let mut ram = Ram::new();
        let image = vec![1u8; MEMORY_SIZE + 1];
        assert_eq!(
            ram.load(&image),
            Err(CpuError::ProgramTooLarge { length: 257 })
        );
        ram.load(&image[..MEMORY_SIZE]).unwrap();
        assert_eq!(ram.as_bytes()[0xFF], 1);
    }
}
