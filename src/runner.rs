use std::time::{Duration, Instant};

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{DisplayCommands, KeyboardCommands, SoundCommands},
    opcode::Operation,
    timer::Pacer,
    ProcessError,
};

/// Drives a [`ChipSet`] from wall-clock time.
///
/// Instructions and timers run on two independent pacers, every call to
/// [`advance`](Runner::advance) catches both of them up with the elapsed
/// time. The display is only redrawn if at least one instruction changed it.
pub struct Runner<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    chip: ChipSet,
    display: D,
    keyboard: K,
    sound: S,
    cpu: Pacer,
    timers: Pacer,
    playing: bool,
}

impl<D, K, S> Runner<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    pub fn new(chip: ChipSet, display: D, keyboard: K, sound: S) -> Self {
        Self::with_hertz(chip, display, keyboard, sound, cpu::HERTZ)
    }

    /// Runs the instructions at `cpu_hertz` instead of the default rate,
    /// the timers always run at 60Hz.
    pub fn with_hertz(chip: ChipSet, display: D, keyboard: K, sound: S, cpu_hertz: u64) -> Self {
        Self {
            chip,
            display,
            keyboard,
            sound,
            cpu: Pacer::from_hertz(cpu_hertz),
            timers: Pacer::from_hertz(timer::HERTZ),
            playing: false,
        }
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    /// Catches the machine up with the elapsed time.
    ///
    /// Returns the amount of instructions executed. On an error the
    /// machine stays on the failing instruction, the timers and devices
    /// are still brought up to date.
    pub fn advance(&mut self, elapsed: Duration) -> Result<u32, ProcessError> {
        self.chip.set_keyboard(&self.keyboard.get_keyboard());

        let due = self.cpu.advance(elapsed);
        let ticks = self.timers.advance(elapsed);

        let mut redraw = false;
        let mut executed = 0;
        let mut result = Ok(());
        for _ in 0..due {
            match self.chip.next() {
                Ok(step) => {
                    executed += 1;
                    match step.operation() {
                        Operation::Draw => redraw = true,
                        // nothing changes until a key is pressed
                        Operation::Wait => break,
                        Operation::None => {}
                    }
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        for _ in 0..ticks {
            self.chip.tick();
        }

        if redraw {
            self.display.display(self.chip.get_display());
        }

        let playing = self.chip.is_sound_playing();
        if playing != self.playing {
            log::debug!("sound {}", if playing { "on" } else { "off" });
            self.sound.set_playing(playing);
            self.playing = playing;
        }

        result.map(|_| executed)
    }

    /// Runs until `stop` returns true or the machine fails.
    pub fn run(&mut self, mut stop: impl FnMut(&ChipSet) -> bool) -> Result<(), ProcessError> {
        log::info!("running '{}'", self.chip.get_name());

        let mut last = Instant::now();
        while !stop(&self.chip) {
            let now = Instant::now();
            self.advance(now - last)?;
            last = now;

            std::thread::sleep(self.cpu.remaining().min(self.timers.remaining()));
        }
        Ok(())
    }
}
