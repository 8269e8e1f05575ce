use std::{convert::TryFrom, fmt::Write};

use {
    crate::{
        config::Quirks,
        definitions::{cpu, display, memory},
        devices::Keyboard,
        opcode::{self, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        timer::Timer,
        LoadError, OpcodeError, ProcessError, StackError,
    },
    rand::{rngs::SmallRng, RngCore, SeedableRng},
    thiserror::Error,
    tinyvec::ArrayVec,
};

/// A condition that did not stop the execution, but has to be
/// looked at by the caller.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Condition {
    #[error("An unsupported opcode was skipped {0:#06X?}.")]
    UnknownOpcode(Opcode),
    #[error("The machine code routine at {0:#05X} can not be executed and was skipped.")]
    UnsupportedRoutine(u16),
    #[error("The stack is full, the call was skipped.")]
    StackOverflow,
    #[error("The stack is empty, the return was skipped.")]
    StackUnderflow,
    #[error("The sprite at ({x}, {y}) crossed the edge of the display.")]
    OutOfBoundsDraw { x: u8, y: u8 },
    #[error("The memory address {address:#06X} is out of bounds.")]
    MemoryOutOfBounds { address: usize },
    #[error("The write to the interpreter area at {address:#06X} was dropped.")]
    ProtectedWrite { address: usize },
    #[error("There is no key {0:#04X}.")]
    KeyOutOfRange(u8),
}

/// The outcome of a single [`ChipSet::next`] call.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Step {
    /// The instruction ran as intended.
    Continue(Operation),
    /// The instruction ran, but hit a reportable condition.
    Reported(Operation, Condition),
}

impl Step {
    pub fn operation(&self) -> Operation {
        match *self {
            Step::Continue(op) | Step::Reported(op, _) => op,
        }
    }

    pub fn condition(&self) -> Option<Condition> {
        match *self {
            Step::Continue(_) => None,
            Step::Reported(_, condition) => Some(condition),
        }
    }
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x050-0x1FF` - Reserved for the interpreter
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: Timer,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`, stored row by row.
    pub(super) display: Vec<bool>,
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    pub(super) quirks: Quirks,
    /// the first condition hit by the running instruction
    pub(super) condition: Option<Condition>,
}

impl ChipSet {
    /// will create a new chipset object with the default quirks
    pub fn new(rom: Rom) -> Result<Self, LoadError> {
        Self::with_quirks(rom, Quirks::default())
    }

    pub fn with_quirks(rom: Rom, quirks: Quirks) -> Result<Self, LoadError> {
        Self::with_rng(rom, quirks, Box::new(SmallRng::from_entropy()))
    }

    /// A chipset whose random numbers are reproducible.
    pub fn with_seed(rom: Rom, quirks: Quirks, seed: u64) -> Result<Self, LoadError> {
        Self::with_rng(rom, quirks, Box::new(SmallRng::seed_from_u64(seed)))
    }

    pub fn with_rng(
        rom: Rom,
        quirks: Quirks,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, LoadError> {
        // initialize all the memory with 0
        let mut ram = vec![0; memory::SIZE];

        // load fonts
        ram[display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        let mut chip = Self {
            name: String::new(),
            opcode: 0,
            memory: ram,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: vec![false; display::RESOLUTION],
            keyboard: Keyboard::new(),
            rng,
            quirks,
            condition: None,
        };
        chip.load(&rom)?;
        Ok(chip)
    }

    /// Copies the rom into memory at `0x200`. The rest of the memory is
    /// left as is.
    pub fn load(&mut self, rom: &Rom) -> Result<(), LoadError> {
        rom.validate()?;

        let start = cpu::PROGRAM_COUNTER as usize;
        let data = rom.get_data();
        self.memory[start..(start + data.len())].copy_from_slice(data);
        self.name = rom.get_name().to_string();

        log::debug!("loaded rom '{}' ({} bytes)", self.name, data.len());
        Ok(())
    }

    /// Replaces the random number generator.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), OpcodeError> {
        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter as usize)?;
        Ok(())
    }

    /// will advance the program by a single step
    pub fn next(&mut self) -> Result<Step, ProcessError> {
        self.set_opcode()?;
        self.condition = None;

        let operation = match Instruction::try_from(self.opcode) {
            Ok(instruction) => {
                self.trace(&instruction);
                self.calc(&instruction)?
            }
            Err(err) if self.quirks.strict_opcodes => return Err(err.into()),
            Err(OpcodeError::InvalidOpcode(opcode)) => {
                self.report(Condition::UnknownOpcode(opcode));
                self.step(ProgramCounterStep::Next);
                Operation::None
            }
            Err(err) => return Err(err.into()),
        };

        Ok(match self.condition.take() {
            Some(condition) => Step::Reported(operation, condition),
            None => Step::Continue(operation),
        })
    }

    /// Logs the instruction about to run together with the registers it
    /// reads, before they are changed.
    fn trace(&self, instruction: &Instruction) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }

        let mut touched = String::new();
        for register in instruction.operands().iter().flatten() {
            // writing into a string never fails
            let _ = write!(
                touched,
                " V{:X}={:#04X}",
                register, self.registers[*register]
            );
        }
        log::trace!(
            "{:#06X}: {:#06X} {:<16} I={:#06X} SP={}{}",
            self.program_counter,
            self.opcode,
            instruction.to_string(),
            self.index_register,
            self.stack.len(),
            touched
        );
    }

    /// Counts both timers down by one, to be called at 60Hz.
    pub fn tick(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Logs the condition and keeps the first one of the running
    /// instruction.
    pub(super) fn report(&mut self, condition: Condition) {
        log::warn!(
            "{:#06X}: {:#06X} {}",
            self.program_counter,
            self.opcode,
            condition
        );
        self.condition.get_or_insert(condition);
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        // copy_from_slice checks the keys lenght during copy
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// The beeper is on as long as the sound timer is not zero.
    pub fn is_sound_playing(&self) -> bool {
        self.sound_timer.is_active()
    }

    /// Will return a immutable slice of the current display configuration,
    /// row-major.
    pub fn get_display(&self) -> &[bool] {
        &self.display[..]
    }

    /// The pixel at the given coordinates, `false` outside of the display.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < display::WIDTH && y < display::HEIGHT && self.display[y * display::WIDTH + x]
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The return addresses, the last one is the top of the stack.
    pub fn get_stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    /// The last opcode that was fetched.
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_quirks(&self) -> Quirks {
        self.quirks
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        if self.stack.len() == cpu::stack::SIZE {
            Err(StackError::Full)
        } else {
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}

impl ProgramCounter for ChipSet {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
