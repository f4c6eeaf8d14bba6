//! Keyboard layouts: the two mapping stages behind `translate`.

/// `MapVirtualKey`-style lookups. Unmapped inputs return 0.
pub trait KeyboardLayout {
    /// `MAPVK_VSC_TO_VK`
    fn scan_code_to_virtual_key(&self, scan_code: u32) -> u32;
    /// `MAPVK_VK_TO_CHAR`
    fn virtual_key_to_char(&self, virtual_key: u32) -> u32;
}

/// Built-in US QWERTY tables (unshifted, no numlock).
#[derive(Clone, Copy, Debug, Default)]
pub struct UsLayout;

impl KeyboardLayout for UsLayout {
    fn scan_code_to_virtual_key(&self, scan_code: u32) -> u32 {
        let vk: u8 = match scan_code {
            0x01 => 0x1B, // VK_ESCAPE
            0x02..=0x0A => b'1' + (scan_code - 0x02) as u8,
            0x0B => b'0',
            0x0C => 0xBD, // VK_OEM_MINUS
            0x0D => 0xBB, // VK_OEM_PLUS
            0x0E => 0x08, // VK_BACK
            0x0F => 0x09, // VK_TAB
            0x10 => b'Q',
            0x11 => b'W',
            0x12 => b'E',
            0x13 => b'R',
            0x14 => b'T',
            0x15 => b'Y',
            0x16 => b'U',
            0x17 => b'I',
            0x18 => b'O',
            0x19 => b'P',
            0x1A => 0xDB, // VK_OEM_4
            0x1B => 0xDD, // VK_OEM_6
            0x1C => 0x0D, // VK_RETURN
            0x1D => 0x11, // VK_CONTROL
            0x1E => b'A',
            0x1F => b'S',
            0x20 => b'D',
            0x21 => b'F',
            0x22 => b'G',
            0x23 => b'H',
            0x24 => b'J',
            0x25 => b'K',
            0x26 => b'L',
            0x27 => 0xBA, // VK_OEM_1
            0x28 => 0xDE, // VK_OEM_7
            0x29 => 0xC0, // VK_OEM_3
            0x2A => 0xA0, // VK_LSHIFT
            0x2B => 0xDC, // VK_OEM_5
            0x2C => b'Z',
            0x2D => b'X',
            0x2E => b'C',
            0x2F => b'V',
            0x30 => b'B',
            0x31 => b'N',
            0x32 => b'M',
            0x33 => 0xBC, // VK_OEM_COMMA
            0x34 => 0xBE, // VK_OEM_PERIOD
            0x35 => 0xBF, // VK_OEM_2
            0x36 => 0xA1, // VK_RSHIFT
            0x37 => 0x6A, // VK_MULTIPLY
            0x38 => 0x12, // VK_MENU
            0x39 => 0x20, // VK_SPACE
            0x4A => 0x6D, // VK_SUBTRACT
            0x4E => 0x6B, // VK_ADD
            _ => 0,
        };
        u32::from(vk)
    }

    fn virtual_key_to_char(&self, virtual_key: u32) -> u32 {
        let ch: u8 = match virtual_key {
            0x08 | 0x09 | 0x0D | 0x1B | 0x20 | 0x30..=0x39 | 0x41..=0x5A => virtual_key as u8,
            0x60..=0x69 => b'0' + (virtual_key - 0x60) as u8,
            0x6A => b'*',
            0x6B => b'+',
            0x6D => b'-',
            0x6E => b'.',
            0x6F => b'/',
            0xBA => b';',
            0xBB => b'=',
            0xBC => b',',
            0xBD => b'-',
            0xBE => b'.',
            0xBF => b'/',
            0xC0 => b'`',
            0xDB => b'[',
            0xDC => b'\\',
            0xDD => b']',
            0xDE => b'\'',
            _ => 0,
        };
        u32::from(ch)
    }
}

/// Whatever layout is active for the calling thread, via `MapVirtualKeyW`.
#[cfg(windows)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLayout;

#[cfg(windows)]
impl KeyboardLayout for SystemLayout {
    fn scan_code_to_virtual_key(&self, scan_code: u32) -> u32 {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::{MapVirtualKeyW, MAPVK_VSC_TO_VK};
        unsafe { MapVirtualKeyW(scan_code, MAPVK_VSC_TO_VK) }
    }

    fn virtual_key_to_char(&self, virtual_key: u32) -> u32 {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::{MapVirtualKeyW, MAPVK_VK_TO_CHAR};
        unsafe { MapVirtualKeyW(virtual_key, MAPVK_VK_TO_CHAR) }
    }
}
