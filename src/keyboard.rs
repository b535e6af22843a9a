use log::warn;

pub const KEY_COUNT: usize = 16;

/// Logical hex keypad, 0x0 - 0xF. Only the input side writes to it.
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    pub fn update_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => warn!("ignoring event for key {key:#x}, the keypad only has 16 keys"),
        }
    }

    // register values go up to 0xFF, only the low nibble names a key
    pub fn get_key_status_from_num(&self, n: u8) -> bool {
        self.keys[(n & 0xF) as usize]
    }

    /// Lowest numbered key that is currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|down| *down).map(|i| i as u8)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = Keyboard::new();
        keys.update_key(0xA, true);
        assert!(keys.get_key_status_from_num(0xA));
        keys.update_key(0xA, false);
        assert!(!keys.get_key_status_from_num(0xA));
    }

    #[test]
    fn out_of_range_keys_are_ignored() {
        let mut keys = Keyboard::new();
        keys.update_key(0x10, true);
        assert_eq!(keys.first_pressed(), None);
    }

    #[test]
    fn lowest_key_wins() {
        let mut keys = Keyboard::new();
        keys.update_key(0xC, true);
        keys.update_key(0x3, true);
        assert_eq!(keys.first_pressed(), Some(0x3));
        keys.reset();
        assert_eq!(keys.first_pressed(), None);
    }

    #[test]
    fn lookups_use_the_low_nibble() {
        let mut keys = Keyboard::new();
        keys.update_key(0x2, true);
        assert!(keys.get_key_status_from_num(0x12));
    }
}
