//! The pretty print implementation for the [`ChipSet`](super::ChipSet).
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt::{self, Write};

use once_cell::sync::Lazy;

use super::ChipSet;
use crate::definitions::cpu;

/// The amount of entries printed per line, has to be bigger then 1.
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// The formatted integer will be 2 symbols for the prefix (0x)
/// and 4 for the rest long.
const INTSIZE: usize = 6;

/// Will add an indent
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// will format all integer types the same way
fn integer_formatter(line: &mut String, data: impl fmt::UpperHex) -> fmt::Result {
    write!(line, "{:#0width$X}", data, width = INTSIZE)
}

/// will format the pointers according to definition
fn pointer_formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
    integer_formatter(line, from)?;
    line.push_str(" - ");
    integer_formatter(line, to)?;
    line.push_str(" :");
    Ok(())
}

/// The line used when there are at least two rows of zeros.
static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
    const FILLER_BASE: &str = "...";
    let zero = format!("{:#0width$X}", 0, width = INTSIZE);
    let length = zero.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1) - FILLER_BASE.len();
    let filler = " ".repeat(length / 2);
    format!("{}{}{}{}{}", zero, filler, FILLER_BASE, filler, zero)
});

static TRUE: Lazy<String> = Lazy::new(|| format!("{:<width$}", "true", width = INTSIZE));
static FALSE: Lazy<String> = Lazy::new(|| format!("{:<width$}", "false", width = INTSIZE));

/// Prints the memory as opcodes, collapsing consecutive rows of zeros.
fn memory_printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
    // a row holds HEX_PRINT_STEP opcodes of two bytes each
    const ROW_BYTES: usize = HEX_PRINT_STEP * 2;

    struct Row<'a> {
        from: usize,
        to: usize,
        data: &'a [u8],
        only_null: bool,
    }

    let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / ROW_BYTES);
    for (i, data) in memory.chunks(ROW_BYTES).enumerate() {
        let from = i * ROW_BYTES;
        let to = from + data.len() - 1;
        let only_null = data.iter().all(|&b| b == 0);

        if let Some(last) = rows.last_mut() {
            if only_null && last.only_null {
                last.to = to;
                continue;
            }
        }
        rows.push(Row {
            from,
            to,
            data,
            only_null,
        });
    }

    let mut res = String::new();
    for row in rows {
        indent_helper(&mut res, indent);
        pointer_formatter(&mut res, row.from, row.to)?;
        res.push(' ');

        if row.only_null && row.to - row.from >= ROW_BYTES {
            res.push_str(&ZERO_FILLER);
        } else {
            let words: Vec<u16> = row
                .data
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
                .collect();
            entries(&mut res, &words, |line, word| integer_formatter(line, *word))?;
        }
        res.push(END_OF_LINE);
    }
    res.pop();
    Ok(res)
}

/// Prints the data in rows of [`HEX_PRINT_STEP`] with their offsets.
fn rows_printer<T>(
    data: &[T],
    indent: usize,
    mut formatter: impl FnMut(&mut String, &T) -> fmt::Result,
) -> Result<String, fmt::Error> {
    let mut res = String::new();
    for (i, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
        let from = i * HEX_PRINT_STEP;
        indent_helper(&mut res, indent);
        pointer_formatter(&mut res, from, from + chunk.len() - 1)?;
        res.push(' ');
        entries(&mut res, chunk, &mut formatter)?;
        // the bool fillers are padded
        res.truncate(res.trim_end().len());
        res.push(END_OF_LINE);
    }
    res.pop();
    Ok(res)
}

/// Writes the entries separated by a single space.
fn entries<T>(
    line: &mut String,
    data: &[T],
    mut formatter: impl FnMut(&mut String, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, entry) in data.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        formatter(line, entry)?;
    }
    Ok(())
}

/// A single indented value.
fn value_printer(data: impl fmt::UpperHex) -> Result<String, fmt::Error> {
    let mut res = String::with_capacity(INDENT_SIZE + INTSIZE);
    indent_helper(&mut res, INDENT_SIZE);
    integer_formatter(&mut res, data)?;
    Ok(res)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nam = String::with_capacity(INDENT_SIZE + self.name.len());
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(&self.name);

        let opc = value_printer(self.opcode)?;
        let prc = value_printer(self.program_counter)?;
        let idx = value_printer(self.index_register)?;
        let tim = rows_printer(
            &[self.delay_timer.get_value(), self.sound_timer.get_value()],
            INDENT_SIZE,
            |line, value| integer_formatter(line, *value),
        )?;
        let mem = memory_printer(&self.memory, INDENT_SIZE)?;
        let key = rows_printer(self.keyboard.get_keys(), INDENT_SIZE, |line, value| {
            line.push_str(if *value { TRUE.as_str() } else { FALSE.as_str() });
            Ok(())
        })?;

        // the stack is filled up so it always prints the same size
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);
        let sta = rows_printer(&stack, INDENT_SIZE, |line, value| {
            integer_formatter(line, *value)
        })?;
        let reg = rows_printer(&self.registers, INDENT_SIZE, |line, value| {
            integer_formatter(line, *value)
        })?;

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tTimers :\n{}\n\
                \tMemory :\n{}\n\
                \tKeyboard :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam, opc, prc, idx, tim, mem, key, sta, reg
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        chip8::ChipSet, config::Quirks, definitions::keyboard, resources::Rom,
    };

    const OUTPUT_PRINT: &str = "\
        Chipset {\n\
            \tProgram Name :\n\
                \t\tloop\n\
            \tOpcode :\n\
                \t\t0x0000\n\
            \tProgram Counter :\n\
                \t\t0x0200\n\
            \tIndex Register :\n\
                \t\t0x0000\n\
            \tTimers :\n\
                \t\t0x0000 - 0x0001 : 0x0000 0x0000\n\
            \tMemory :\n\
                \t\t0x0000 - 0x000F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0\n\
                \t\t0x0010 - 0x001F : 0x10F0 0x10F0 0x9090 0xF010 0x10F0 0x80F0 0x10F0 0xF080\n\
                \t\t0x0020 - 0x002F : 0xF090 0xF0F0 0x1020 0x4040 0xF090 0xF090 0xF0F0 0x90F0\n\
                \t\t0x0030 - 0x003F : 0x10F0 0xF090 0xF090 0x90E0 0x90E0 0x90E0 0xF080 0x8080\n\
                \t\t0x0040 - 0x004F : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080\n\
                \t\t0x0050 - 0x01FF : 0x0000                    ...                    0x0000\n\
                \t\t0x0200 - 0x020F : 0x00E0 0x1200 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0210 - 0x0FFF : 0x0000                    ...                    0x0000\n\
            \tKeyboard :\n\
                \t\t0x0000 - 0x0007 : false  true   false  true   false  true   false  true\n\
                \t\t0x0008 - 0x000F : false  true   false  true   false  true   false  true\n\
            \tStack :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tRegister :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
        }";

    #[test]
    /// tests if the pretty print output is as expected
    fn test_full_print() {
        let rom = Rom::from_opcodes("loop", &[0x00E0, 0x1200]);
        let mut chip = ChipSet::with_seed(rom, Quirks::default(), 0).unwrap();
        let mut keys = [false; keyboard::SIZE];

        for (index, key) in keys.iter_mut().enumerate() {
            *key = index % 2 != 0;
        }

        chip.set_keyboard(&keys);

        let actual_full = format!("{}", chip);
        let actual = actual_full.split('\n').collect::<Vec<_>>();
        let expected = OUTPUT_PRINT.split('\n').collect::<Vec<_>>();

        assert_eq!(expected.len(), actual.len());
        for (exp, act) in expected.iter().zip(actual.iter()) {
            assert_eq!(exp, act);
        }
    }

    #[test]
    fn test_stack_is_printed_in_call_order() {
        let rom = Rom::from_opcodes("calls", &[0x2204, 0x0000, 0x2208]);
        let mut chip = ChipSet::with_seed(rom, Quirks::default(), 0).unwrap();
        chip.next().unwrap();
        chip.next().unwrap();

        let printed = chip.to_string();
        assert!(printed.contains("\t\t0x0000 - 0x0007 : 0x0200 0x0204 0x0000"));
    }
}
