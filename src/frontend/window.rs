use std::error::Error;

use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use octo_vm::{HEIGHT, PIXELS, WIDTH};

const LIT: u32 = from_u8_rgb(0, 127, 255);
const DARK: u32 = from_u8_rgb(0, 0, 0);

const fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

pub fn scale_from(factor: u8) -> Result<Scale, String> {
    match factor {
        1 => Ok(Scale::X1),
        2 => Ok(Scale::X2),
        4 => Ok(Scale::X4),
        8 => Ok(Scale::X8),
        16 => Ok(Scale::X16),
        32 => Ok(Scale::X32),
        other => Err(format!("unsupported scale {other}, use 1, 2, 4, 8, 16 or 32")),
    }
}

pub struct Screen {
    pixel_buffer: Vec<u32>,
    window: Window,
}

impl Screen {
    pub fn new(scale: Scale) -> Result<Self, Box<dyn Error>> {
        let mut window = Window::new(
            "octo-vm - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
        Ok(Self {
            pixel_buffer: vec![DARK; PIXELS],
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }

    pub fn held_keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }

    /// Present `frame` if there is a new one, otherwise just pump window events.
    pub fn sync(&mut self, frame: Option<&[u8; PIXELS]>) -> Result<(), Box<dyn Error>> {
        match frame {
            Some(frame) => {
                for (pixel, bit) in self.pixel_buffer.iter_mut().zip(frame.iter()) {
                    *pixel = if *bit == 1 { LIT } else { DARK };
                }
                self.window
                    .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)?;
            }
            None => self.window.update(),
        }
        Ok(())
    }
}
