//! Runtime behaviour switches for the places where chip8 interpreters
//! historically disagree.

/// Which register the `8XY6` / `8XYE` shifts read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSource {
    /// `VX = VY >> 1` as on the COSMAC VIP.
    Vy,
    /// `VX = VX >> 1`, `VY` is ignored (CHIP-48 / SUPER-CHIP).
    Vx,
}

/// Which bit of the source ends up in `VF` for `8XYE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftLeftFlag {
    /// The bit that is actually shifted out (bit 7).
    MostSignificant,
    /// `source >> 3`, unmasked. Some interpreters shipped with this.
    LegacyBit3,
}

/// What happens when a program calls with a full stack or returns with an
/// empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPolicy {
    /// Return an error and leave the machine on the offending instruction.
    Halt,
    /// Skip the push / pop, report it and move on to the next instruction.
    Ignore,
}

/// The quirks used by a [`ChipSet`](crate::chip8::ChipSet).
///
/// # Example
/// ```rust
/// # use chip::config::*;
/// let quirks = Quirks::default();
/// assert_eq!(quirks.shift_left_flag, ShiftLeftFlag::MostSignificant);
///
/// let legacy = Quirks::legacy();
/// assert!(legacy.shift_writes_source);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    pub shift_source: ShiftSource,
    pub shift_left_flag: ShiftLeftFlag,
    /// Also store the shifted value back into `VY`.
    pub shift_writes_source: bool,
    /// Clip sprites at the right and bottom edge instead of wrapping them
    /// around. The starting coordinate always wraps.
    pub clip_sprites: bool,
    /// Unknown opcodes stop execution instead of being skipped.
    pub strict_opcodes: bool,
    pub stack_policy: StackPolicy,
}

impl Quirks {
    /// The behaviour of the classic C interpreters this core was checked
    /// against, shift quirks included.
    pub fn legacy() -> Self {
        Self {
            shift_source: ShiftSource::Vy,
            shift_left_flag: ShiftLeftFlag::LegacyBit3,
            shift_writes_source: true,
            ..Self::default()
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            shift_source: ShiftSource::Vy,
            shift_left_flag: ShiftLeftFlag::MostSignificant,
            shift_writes_source: false,
            clip_sprites: true,
            strict_opcodes: false,
            stack_policy: StackPolicy::Halt,
        }
    }
}
