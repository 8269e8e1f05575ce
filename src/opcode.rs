//! Opcode abstractions, functionality and constants.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a nibble in bits
const NIBBLE: u16 = 0x4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the instruction family, the highest nibble
    fn t(&self) -> u8;

    /// the lowest twelve bits, an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` and `Y` are register indexes
    /// - `N` is a constant or an opcode subtype
    fn xyn(&self) -> (usize, usize, u8);

    /// the register index `X` in `TXTT`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE) as usize;
        let n = (self & OPCODE_MASK_000F) as u8;
        (self.x(), y, n)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Applies the step to the given program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x200), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, program_counter: u16) -> u16 {
        match *self {
            ProgramCounterStep::None => program_counter,
            ProgramCounterStep::Next => program_counter.wrapping_add(memory::opcodes::SIZE),
            ProgramCounterStep::Skip => program_counter.wrapping_add(2 * memory::opcodes::SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents a command from the interpreter up to the frontend.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The machine waits for a key press, the
    /// program counter did not move.
    Wait,
    /// The display changed and should be redrawn.
    Draw,
}

/// A fully decoded instruction, one variant per form.
///
/// Register operands (`x`, `y`) are indexes into `V0..=VF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN` call a machine code routine
    Sys { nnn: u16 },
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { nnn: u16 },
    /// `2NNN`
    Call { nnn: u16 },
    /// `3XNN`
    SkipEqualConst { x: usize, nn: u8 },
    /// `4XNN`
    SkipNotEqualConst { x: usize, nn: u8 },
    /// `5XY0`
    SkipEqual { x: usize, y: usize },
    /// `6XNN`
    SetConst { x: usize, nn: u8 },
    /// `7XNN`
    AddConst { x: usize, nn: u8 },
    /// `8XY0`
    Assign { x: usize, y: usize },
    /// `8XY1`
    Or { x: usize, y: usize },
    /// `8XY2`
    And { x: usize, y: usize },
    /// `8XY3`
    Xor { x: usize, y: usize },
    /// `8XY4`
    Add { x: usize, y: usize },
    /// `8XY5`
    Sub { x: usize, y: usize },
    /// `8XY6`
    ShiftRight { x: usize, y: usize },
    /// `8XY7`
    SubReverse { x: usize, y: usize },
    /// `8XYE`
    ShiftLeft { x: usize, y: usize },
    /// `9XY0`
    SkipNotEqual { x: usize, y: usize },
    /// `ANNN`
    SetIndex { nnn: u16 },
    /// `BNNN`
    JumpOffset { nnn: u16 },
    /// `CXNN`
    Random { x: usize, nn: u8 },
    /// `DXYN`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E`
    SkipKeyPressed { x: usize },
    /// `EXA1`
    SkipKeyNotPressed { x: usize },
    /// `FX07`
    GetDelayTimer { x: usize },
    /// `FX0A`
    AwaitKeyPress { x: usize },
    /// `FX15`
    SetDelayTimer { x: usize },
    /// `FX18`
    SetSoundTimer { x: usize },
    /// `FX1E`
    AddIndex { x: usize },
    /// `FX29`
    SetIndexToGlyph { x: usize },
    /// `FX33`
    StoreBcd { x: usize },
    /// `FX55`
    StoreRegisters { x: usize },
    /// `FX65`
    LoadRegisters { x: usize },
}

impl Instruction {
    /// The `VX` and `VY` registers named by the instruction.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// assert_eq!(decode(0x8124).unwrap().operands(), [Some(0x1), Some(0x2)]);
    /// assert_eq!(decode(0x6A0F).unwrap().operands(), [Some(0xA), None]);
    /// assert_eq!(decode(0x00E0).unwrap().operands(), [None, None]);
    /// ```
    pub fn operands(&self) -> [Option<usize>; 2] {
        use Instruction::*;

        match *self {
            Sys { .. } | Clear | Return | Jump { .. } | Call { .. } | SetIndex { .. } => {
                [None, None]
            }
            // reads V0
            JumpOffset { .. } => [Some(0), None],
            SkipEqual { x, y }
            | Assign { x, y }
            | Or { x, y }
            | And { x, y }
            | Xor { x, y }
            | Add { x, y }
            | Sub { x, y }
            | ShiftRight { x, y }
            | SubReverse { x, y }
            | ShiftLeft { x, y }
            | SkipNotEqual { x, y }
            | Draw { x, y, .. } => [Some(x), Some(y)],
            SkipEqualConst { x, .. }
            | SkipNotEqualConst { x, .. }
            | SetConst { x, .. }
            | AddConst { x, .. }
            | Random { x, .. }
            | SkipKeyPressed { x }
            | SkipKeyNotPressed { x }
            | GetDelayTimer { x }
            | AwaitKeyPress { x }
            | SetDelayTimer { x }
            | SetSoundTimer { x }
            | AddIndex { x }
            | SetIndexToGlyph { x }
            | StoreBcd { x }
            | StoreRegisters { x }
            | LoadRegisters { x } => [Some(x), None],
        }
    }
}

/// Decodes the raw opcode, see [`Instruction`].
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// assert_eq!(decode(0x6A0F), Ok(Instruction::SetConst { x: 0xA, nn: 0x0F }));
/// assert!(decode(0x5121).is_err());
/// ```
pub fn decode(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    Instruction::try_from(opcode)
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        use Instruction::*;

        let nnn = value.nnn();
        let (x, nn) = value.xnn();
        let (_, y, n) = value.xyn();

        let res = match (value.t(), n) {
            (0x0, _) => match nnn {
                0x0E0 => Clear,
                0x0EE => Return,
                _ => Sys { nnn },
            },
            (0x1, _) => Jump { nnn },
            (0x2, _) => Call { nnn },
            (0x3, _) => SkipEqualConst { x, nn },
            (0x4, _) => SkipNotEqualConst { x, nn },
            (0x5, 0x0) => SkipEqual { x, y },
            (0x6, _) => SetConst { x, nn },
            (0x7, _) => AddConst { x, nn },
            (0x8, 0x0) => Assign { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => Add { x, y },
            (0x8, 0x5) => Sub { x, y },
            (0x8, 0x6) => ShiftRight { x, y },
            (0x8, 0x7) => SubReverse { x, y },
            (0x8, 0xE) => ShiftLeft { x, y },
            (0x9, 0x0) => SkipNotEqual { x, y },
            (0xA, _) => SetIndex { nnn },
            (0xB, _) => JumpOffset { nnn },
            (0xC, _) => Random { x, nn },
            (0xD, _) => Draw { x, y, n },
            (0xE, _) => match nn {
                0x9E => SkipKeyPressed { x },
                0xA1 => SkipKeyNotPressed { x },
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            (0xF, _) => match nn {
                0x07 => GetDelayTimer { x },
                0x0A => AwaitKeyPress { x },
                0x15 => SetDelayTimer { x },
                0x18 => SetSoundTimer { x },
                0x1E => AddIndex { x },
                0x29 => SetIndexToGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            _ => return Err(OpcodeError::InvalidOpcode(value)),
        };
        Ok(res)
    }
}

/// Disassembles the instruction into the usual chip8 mnemonics.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sys { nnn } => write!(f, "SYS {:#05X}", nnn),
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            SkipEqualConst { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            SkipNotEqualConst { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            SkipEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            SetConst { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            AddConst { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Assign { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            SetIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            JumpOffset { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            GetDelayTimer { x } => write!(f, "LD V{:X}, DT", x),
            AwaitKeyPress { x } => write!(f, "LD V{:X}, K", x),
            SetDelayTimer { x } => write!(f, "LD DT, V{:X}", x),
            SetSoundTimer { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            SetIndexToGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
