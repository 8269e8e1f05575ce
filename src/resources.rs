use crate::{definitions::memory, LoadError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single program image with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program bytes, loaded as is at `0x200`
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: impl Into<Box<[u8]>>) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Builds a rom from big-endian opcodes.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::from_opcodes("loop", &[0x00E0, 0x1200]);
    /// assert_eq!(rom.get_data(), &[0x00, 0xE0, 0x12, 0x00]);
    /// ```
    pub fn from_opcodes(name: &str, opcodes: &[u16]) -> Self {
        let data: Vec<u8> = opcodes.iter().flat_map(|op| op.to_be_bytes()).collect();
        Self::new(name, data)
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Checks if the rom fits into program memory.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.data.len() > memory::PROGRAM_SIZE {
            Err(LoadError::TooLarge {
                len: self.data.len(),
                max: memory::PROGRAM_SIZE,
            })
        } else {
            Ok(())
        }
    }
}
