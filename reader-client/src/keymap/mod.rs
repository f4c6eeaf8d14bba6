//! Scan code → text.
//!
//! Each byte the driver returns is a set-1 make code. It goes through the
//! layout's scan-code table to a virtual key, then through the virtual-key
//! table to a character. Both stages are truncated to a byte and the result
//! is read as ASCII, so the output has exactly one `char` per input byte.
//! Codes the layout cannot map come through as `'\0'`.

pub mod layout;

pub use layout::{KeyboardLayout, UsLayout};

#[cfg(windows)]
pub use layout::SystemLayout;

pub fn translate<L: KeyboardLayout + ?Sized>(layout: &L, scan_codes: &[u8]) -> String {
    scan_codes
        .iter()
        .map(|&scan_code| {
            let virtual_key = layout.scan_code_to_virtual_key(u32::from(scan_code)) as u8;
            let ch = layout.virtual_key_to_char(u32::from(virtual_key)) as u8;
            if ch.is_ascii() { char::from(ch) } else { '?' }
        })
        .collect()
}
