use thiserror::Error;

use crate::MEMORY_SIZE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("program was empty")]
    Empty,
    #[error("line {line}: invalid number '{text}'")]
    InvalidNumber { line: usize, text: String },
    #[error("program is {length} bytes, but memory only holds 256")]
    TooLarge { length: usize },
}

/// A program ready to be put into memory: one byte per line of source, each
/// written as a binary literal.
///
/// ```text
/// # print the number 8
/// 10000010 # LDI R0,8
/// 00000000
/// 00001000
/// 01000111 # PRN R0
/// 00000000
/// 00000001 # HLT
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    bytes: Vec<u8>,
    entry: u16,
}

impl ProgramImage {
    pub fn new(bytes: Vec<u8>) -> Result<ProgramImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > MEMORY_SIZE {
            return Err(ImageError::TooLarge {
                length: bytes.len(),
            });
        }
        Ok(ProgramImage { bytes, entry: 0 })
    }

    pub fn parse(source: &str) -> Result<ProgramImage, ImageError> {
        let mut bytes = Vec::new();
        for (index, line) in source.lines().enumerate() {
            // Only the first word counts; anything after it is commentary.
            let word = match line.split_whitespace().next() {
                Some(word) if !word.starts_with('#') => word,
                _ => continue,
            };
            let byte = u8::from_str_radix(word, 2).map_err(|_| ImageError::InvalidNumber {
                line: index + 1,
                text: word.to_string(),
            })?;
            bytes.push(byte);
        }
        log::debug!("Parsed a {}-byte program image", bytes.len());
        ProgramImage::new(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where execution starts. Always 0 for parsed images.
    pub fn entry(&self) -> u16 {
        self.entry
    }
}
