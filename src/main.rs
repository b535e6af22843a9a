// Desktop front end: window, keys and sound around the library machine.
//
// Separately:
// CPU: --hz instructions per second (500 by default)
// Display: 60 times per second
// Timer: 60 times per second, on their own thread

use std::{
    error::Error,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Instant,
};

use clap::Parser;
use log::{debug, error, info, trace, warn};

use octo_vm::{Clock, Emulator, Quirks, SharedEmulator, TimerThread, TIMER_DEC_PER_SECOND};

mod frontend;

use frontend::{keymap, sound::Sound, window};

#[derive(Parser, Debug)]
#[command(name = "octo-vm")]
#[command(about = "Runs a hex-keypad VM program in a window")]
struct Args {
    /// Program image, loaded verbatim at 0x200
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = 500)]
    hz: u32,

    /// Window scale: 1, 2, 4, 8, 16 or 32
    #[arg(long, default_value_t = 16)]
    scale: u8,

    /// Start from the COSMAC VIP quirks instead of the modern ones
    #[arg(long)]
    vip: bool,

    /// Shifts read VY and store into VX
    #[arg(long)]
    shift_reads_vy: bool,

    /// 8XYE takes VF from the low bit
    #[arg(long)]
    shift_left_flag_low_bit: bool,

    /// BXNN jumps to XNN + VX
    #[arg(long)]
    jump_offset_uses_vx: bool,

    /// FX55 / FX65 leave I unchanged
    #[arg(long)]
    keep_index: bool,

    /// OR / AND / XOR clear VF
    #[arg(long)]
    logic_resets_flag: bool,
}

impl Args {
    fn quirks(&self) -> Quirks {
        let mut quirks = if self.vip {
            Quirks::cosmac_vip()
        } else {
            Quirks::modern()
        };
        quirks.shift_reads_vy |= self.shift_reads_vy;
        quirks.shift_left_flag_low_bit |= self.shift_left_flag_low_bit;
        quirks.jump_offset_uses_vx |= self.jump_offset_uses_vx;
        quirks.logic_resets_flag |= self.logic_resets_flag;
        if self.keep_index {
            quirks.load_store_increments_index = false;
        }
        quirks
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("octo_vm=info"))
        .init();

    let args = Args::parse();
    let scale = window::scale_from(args.scale)?;
    let quirks = args.quirks();

    let program = fs::read(&args.rom)?;
    let mut emu = Emulator::new(quirks);
    emu.load_program(&program)?;
    info!(
        "loaded {} ({} bytes), {} Hz, {:?}",
        args.rom.display(),
        program.len(),
        args.hz,
        quirks
    );

    let emu: SharedEmulator = Arc::new(Mutex::new(emu));
    let mut screen = window::Screen::new(scale)?;
    let sound = match Sound::new() {
        Ok(sound) => Some(sound),
        Err(err) => {
            warn!("running without sound: {err}");
            None
        }
    };
    let mut timers = TimerThread::spawn(Arc::clone(&emu), TIMER_DEC_PER_SECOND);
    let mut cpu_clock = Clock::from_hz(args.hz);
    let mut halted = false;

    while screen.is_running() {
        let keys = keymap::keypad_state(&screen.held_keys());
        let cycles = cpu_clock.ticks_due(Instant::now());

        let frame = {
            let mut emu = emu.lock().map_err(|_| "machine lock poisoned")?;
            for (key, pressed) in keys.iter().enumerate() {
                emu.set_key(key as u8, *pressed);
            }
            for _ in 0..cycles {
                if halted {
                    break;
                }
                if let Err(fault) = emu.run_cycle() {
                    if !fault.is_recoverable() {
                        error!("halting: {fault}");
                        trace!("memory at halt:\n{}", emu.memory_dump());
                        halted = true;
                    }
                }
            }
            if let Some(sound) = &sound {
                sound.set_active(emu.sound_active());
            }
            if emu.beep_pending() {
                debug!("beep");
            }
            emu.consume_dirty_flag()
                .then(|| emu.framebuffer_snapshot())
        };

        screen.sync(frame.as_ref())?;
    }

    timers.stop();
    let emu = emu.lock().map_err(|_| "machine lock poisoned")?;
    debug!(
        "executed opcodes: {}",
        emu.opcode_history()
            .iter()
            .map(|op| format!("{op:04x}"))
            .collect::<Vec<_>>()
            .join(" ")
    );
    info!("bye");
    Ok(())
}
