//! Driver-boundary constants.

/// Device type the driver's control code is registered under.
pub const FILE_DEVICE_KEYBOARD: u32 = 0x0000_000B;
pub const METHOD_BUFFERED: u32 = 0;
pub const FILE_ANY_ACCESS: u32 = 0;

/// Rust equivalent of the `CTL_CODE` macro.
pub const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// Interface class the driver publishes on its raw PDO,
/// `{39AD5308-66FC-11EA-BC55-0242AC130003}`.
pub const FILTER_DEVICE_INTERFACE: u128 = 0x39AD5308_66FC_11EA_BC55_0242AC130003;

/// Queues a request that completes with the scan codes of the next card read.
pub const IOCTL_REQUEST_READER_DATA: u32 =
    ctl_code(FILE_DEVICE_KEYBOARD, 0x1337, METHOD_BUFFERED, FILE_ANY_ACCESS);

/// Output buffer size the driver fills; not self-describing. The driver
/// completes the request on the reader's trailing Enter without copying it,
/// so only the card id's own scan codes arrive.
pub const SCAN_BUFFER_LEN: usize = 11;
