use crate::{
    config::{ShiftLeftFlag, ShiftSource, StackPolicy},
    definitions::{cpu, display, memory},
    opcode::{Instruction, Operation, ProgramCounter, ProgramCounterStep},
    ProcessError,
};

use super::{ChipSet, Condition};

/// The width of a sprite row in pixels
const SPRITE_WIDTH: usize = 8;

impl ChipSet {
    /// Executes the decoded instruction and moves the program counter.
    ///
    /// On an error nothing has been changed, the machine stays on the
    /// instruction.
    pub fn calc(&mut self, instruction: &Instruction) -> Result<Operation, ProcessError> {
        use Instruction::*;

        let mut operation = Operation::None;
        let step = match *instruction {
            Sys { nnn } => {
                // 0NNN
                // Calls a machine code routine of the host, there is none here.
                self.report(Condition::UnsupportedRoutine(nnn));
                ProgramCounterStep::Next
            }
            Clear => {
                // 00E0
                // clear display
                self.display.fill(false);
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            Return => self.return_from_subroutine()?,
            Jump { nnn } => {
                // 1NNN
                // Jumps to address NNN.
                ProgramCounterStep::Jump(nnn)
            }
            Call { nnn } => self.call_subroutine(nnn)?,
            SkipEqualConst { x, nn } => ProgramCounterStep::cond(self.registers[x] == nn),
            SkipNotEqualConst { x, nn } => ProgramCounterStep::cond(self.registers[x] != nn),
            SkipEqual { x, y } => ProgramCounterStep::cond(self.registers[x] == self.registers[y]),
            SetConst { x, nn } => {
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            AddConst { x, nn } => {
                // 7XNN
                // Adds NN to VX. (Carry flag is not changed)
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Assign { x, y } => self.set_register(x, self.registers[y], None),
            Or { x, y } => self.set_register(x, self.registers[x] | self.registers[y], None),
            And { x, y } => self.set_register(x, self.registers[x] & self.registers[y], None),
            Xor { x, y } => self.set_register(x, self.registers[x] ^ self.registers[y], None),
            Add { x, y } => {
                // 8XY4
                // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.set_register(x, res, Some(carry as u8))
            }
            Sub { x, y } => {
                // 8XY5
                // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                let (res, borrow) = self.registers[x].overflowing_sub(self.registers[y]);
                self.set_register(x, res, Some(!borrow as u8))
            }
            ShiftRight { x, y } => {
                // 8XY6
                // Stores the least significant bit of the source in VF and then stores the
                // source shifted to the right by 1 in VX.
                let source = self.shift_source(x, y);
                let res = source >> 1;
                self.write_back_shift(y, res);
                self.set_register(x, res, Some(source & 1))
            }
            SubReverse { x, y } => {
                // 8XY7
                // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                let (res, borrow) = self.registers[y].overflowing_sub(self.registers[x]);
                self.set_register(x, res, Some(!borrow as u8))
            }
            ShiftLeft { x, y } => {
                // 8XYE
                // Stores the most significant bit of the source in VF and then stores the
                // source shifted to the left by 1 in VX.
                let source = self.shift_source(x, y);
                let flag = match self.quirks.shift_left_flag {
                    ShiftLeftFlag::MostSignificant => source >> 7,
                    ShiftLeftFlag::LegacyBit3 => source >> 3,
                };
                let res = source << 1;
                self.write_back_shift(y, res);
                self.set_register(x, res, Some(flag))
            }
            SkipNotEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            SetIndex { nnn } => {
                self.index_register = nnn;
                ProgramCounterStep::Next
            }
            JumpOffset { nnn } => {
                // BNNN
                // Jumps to the address NNN plus V0.
                ProgramCounterStep::Jump(nnn + self.registers[0] as u16)
            }
            Random { x, nn } => {
                // CXNN
                // Sets VX to the result of a bitwise and operation on a random number and NN.
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Draw { x, y, n } => {
                self.draw(x, y, n);
                operation = Operation::Draw;
                ProgramCounterStep::Next
            }
            SkipKeyPressed { x } => ProgramCounterStep::cond(self.is_key_pressed(x)),
            SkipKeyNotPressed { x } => ProgramCounterStep::cond(!self.is_key_pressed(x)),
            GetDelayTimer { x } => {
                self.registers[x] = self.delay_timer.get_value();
                ProgramCounterStep::Next
            }
            AwaitKeyPress { x } => {
                // FX0A
                // A key press is awaited, and then stored in VX. Until then the
                // instruction is run again on every step.
                match self.keyboard.first_pressed() {
                    Some(key) => {
                        self.registers[x] = key as u8;
                        ProgramCounterStep::Next
                    }
                    None => {
                        operation = Operation::Wait;
                        ProgramCounterStep::None
                    }
                }
            }
            SetDelayTimer { x } => {
                self.delay_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            SetSoundTimer { x } => {
                self.sound_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            AddIndex { x } => {
                // FX1E
                // Adds VX to I. VF is not affected.
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
                ProgramCounterStep::Next
            }
            SetIndexToGlyph { x } => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font. Only the lower nibble counts.
                let glyph = (self.registers[x] & 0xF) as usize;
                self.index_register =
                    (display::fontset::LOCATION + display::fontset::GLYPH_SIZE * glyph) as u16;
                ProgramCounterStep::Next
            }
            StoreBcd { x } => {
                // FX33
                // Stores the binary-coded decimal representation of VX, with the most significant
                // of three digits at the address in I, the middle digit at I plus 1, and the least
                // significant digit at I plus 2.
                let i = self.index_register as usize;
                let r = self.registers[x];

                self.write_memory(i, r / 100); // 246u8 / 100 => 2
                self.write_memory(i + 1, r / 10 % 10); // 246u8 / 10 => 24 % 10 => 4
                self.write_memory(i + 2, r % 10); // 246u8 % 10 => 6
                ProgramCounterStep::Next
            }
            StoreRegisters { x } => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I, I ends up
                // behind the last written value.
                let index = self.index_register as usize;
                for offset in 0..=x {
                    self.write_memory(index + offset, self.registers[offset]);
                }
                self.advance_index(x);
                ProgramCounterStep::Next
            }
            LoadRegisters { x } => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I,
                // I ends up behind the last read value.
                let index = self.index_register as usize;
                for offset in 0..=x {
                    self.registers[offset] = self.read_memory(index + offset);
                }
                self.advance_index(x);
                ProgramCounterStep::Next
            }
        };

        self.step(step);
        Ok(operation)
    }

    /// 2NNN
    /// Calls subroutine at NNN, the address of the call is the return address.
    fn call_subroutine(&mut self, nnn: u16) -> Result<ProgramCounterStep, ProcessError> {
        match self.push_stack(self.program_counter) {
            Ok(()) => {
                log::debug!("call {:#05X}, depth {}", nnn, self.stack.len());
                Ok(ProgramCounterStep::Jump(nnn))
            }
            Err(err) => match self.quirks.stack_policy {
                StackPolicy::Halt => Err(err.into()),
                StackPolicy::Ignore => {
                    self.report(Condition::StackOverflow);
                    Ok(ProgramCounterStep::Next)
                }
            },
        }
    }

    /// 00EE
    /// Return from sub routine => pop from stack and move behind the call.
    fn return_from_subroutine(&mut self) -> Result<ProgramCounterStep, ProcessError> {
        match self.pop_stack() {
            Ok(pc) => {
                log::debug!("return to {:#06X}", pc);
                Ok(ProgramCounterStep::Jump(ProgramCounterStep::Next.apply(pc)))
            }
            Err(err) => match self.quirks.stack_policy {
                StackPolicy::Halt => Err(err.into()),
                StackPolicy::Ignore => {
                    self.report(Condition::StackUnderflow);
                    Ok(ProgramCounterStep::Next)
                }
            },
        }
    }

    /// Stores the result of the `8XYT` family. The flag is written last, so
    /// `VF` holds the flag even if it was the target.
    fn set_register(&mut self, x: usize, result: u8, flag: Option<u8>) -> ProgramCounterStep {
        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
        ProgramCounterStep::Next
    }

    fn shift_source(&self, x: usize, y: usize) -> u8 {
        match self.quirks.shift_source {
            ShiftSource::Vy => self.registers[y],
            ShiftSource::Vx => self.registers[x],
        }
    }

    fn write_back_shift(&mut self, y: usize, value: u8) {
        if self.quirks.shift_writes_source && self.quirks.shift_source == ShiftSource::Vy {
            self.registers[y] = value;
        }
    }

    /// DXYN
    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
    /// value doesn’t change after the execution of this instruction. VF is set to 1 if any
    /// screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
    /// doesn’t happen.
    fn draw(&mut self, reg_x: usize, reg_y: usize, n: u8) {
        let index = self.index_register as usize;
        let (vx, vy) = (self.registers[reg_x], self.registers[reg_y]);
        let coorx = vx as usize % display::WIDTH;
        let coory = vy as usize % display::HEIGHT;

        let mut collision = false;
        // a start off the grid is wrapped, but still reported
        let mut outside = vx as usize >= display::WIDTH || vy as usize >= display::HEIGHT;

        for i in 0..n as usize {
            let row = self.read_memory(index + i);

            for j in 0..SPRITE_WIDTH {
                // the most significant bit is the left most pixel
                if row & (0x80 >> j) == 0 {
                    continue;
                }

                let (mut x, mut y) = (coorx + j, coory + i);
                if x >= display::WIDTH || y >= display::HEIGHT {
                    outside = true;
                    if self.quirks.clip_sprites {
                        continue;
                    }
                    x %= display::WIDTH;
                    y %= display::HEIGHT;
                }

                let pixel = &mut self.display[y * display::WIDTH + x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;

        if outside {
            self.report(Condition::OutOfBoundsDraw { x: vx, y: vy });
        }
    }

    /// Keys are only `0-F`, any other value counts as not pressed.
    fn is_key_pressed(&mut self, x: usize) -> bool {
        let key = self.registers[x];
        match self.keyboard.is_pressed(key as usize) {
            Some(pressed) => pressed,
            None => {
                self.report(Condition::KeyOutOfRange(key));
                false
            }
        }
    }

    fn advance_index(&mut self, x: usize) {
        self.index_register = self.index_register.wrapping_add(x as u16 + 1);
    }

    pub(super) fn read_memory(&mut self, address: usize) -> u8 {
        match self.memory.get(address) {
            Some(value) => *value,
            None => {
                self.report(Condition::MemoryOutOfBounds { address });
                0
            }
        }
    }

    /// Programs may only write into their own area, starting at `0x200`.
    pub(super) fn write_memory(&mut self, address: usize, value: u8) {
        if address < cpu::PROGRAM_COUNTER as usize {
            self.report(Condition::ProtectedWrite { address });
        } else if address >= memory::SIZE {
            self.report(Condition::MemoryOutOfBounds { address });
        } else {
            self.memory[address] = value;
        }
    }
}
