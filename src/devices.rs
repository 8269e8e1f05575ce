use std::sync::Arc;

use parking_lot::Mutex;

use crate::definitions::keyboard;

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all the pixels, row-major
    /// [`WIDTH`](crate::definitions::display::WIDTH) pixels per row.
    fn display(&mut self, pixels: &[bool]);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// A snapshot of the sixteen keys `0-F`.
    fn get_keyboard(&self) -> [bool; keyboard::SIZE];
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the beeper
pub trait SoundCommands {
    /// Called whenever the beeper has to be switched on or off.
    fn set_playing(&mut self, on: bool);
}

/// Will store the current state of the
/// hex keyboard.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        self.keys[key] = to;
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.keys[key])
    }

    /// Copies the whole keyboard state.
    ///
    /// # Panics
    /// If `keys` is not exactly sixteen entries long.
    pub fn set_mult(&mut self, keys: &[bool]) {
        assert_eq!(keys.len(), self.keys.len());
        self.keys.copy_from_slice(keys);
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// `None` for key values outside of `0-F`.
    pub fn is_pressed(&self, key: usize) -> Option<bool> {
        self.keys.get(key).copied()
    }

    /// The lowest key that is currently pressed.
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&pressed| pressed)
    }
}

/// A keyboard that can be written from an input thread while the
/// interpreter reads snapshots of it.
#[derive(Default, Debug, Clone)]
pub struct SharedKeyboard {
    keys: Arc<Mutex<[bool; keyboard::SIZE]>>,
}

impl SharedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        self.keys.lock()[key] = to;
    }

    pub fn release_all(&self) {
        *self.keys.lock() = [false; keyboard::SIZE];
    }
}

impl KeyboardCommands for SharedKeyboard {
    fn get_keyboard(&self) -> [bool; keyboard::SIZE] {
        *self.keys.lock()
    }
}
