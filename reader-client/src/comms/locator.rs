//! Device locator: interface ordinal → device path.
//!
//! Enumeration is scoped to devices that are present right now and carry the
//! driver's interface class. The path of the selected entry comes back in a
//! variable-length detail record negotiated in two calls (size, then fill).
//! Nothing is cached between calls; ordinals are only stable within one
//! enumeration pass.

use log::Level;

use super::{DeviceApi, DevicePath, InterfaceClass, InterfaceSet};
use crate::error::{ReaderError, Result};
use crate::reader_log;

/// Size of the `cbSize` field preceding the path in a detail record.
pub const DETAIL_HEADER_LEN: usize = 4;

/// Resolve the interface instance at `ordinal` to its device path.
pub fn resolve_device_path<A: DeviceApi>(
    api: &A,
    class: &InterfaceClass,
    ordinal: u32,
) -> Result<DevicePath> {
    let set = InterfaceSet::open(api, class).map_err(|e| {
        reader_log!(Level::Warn, "locator", "No enumeration set for {}: {}", class, e);
        ReaderError::DriverNotPresent { ordinal }
    })?;

    let iface = match set.interface(class, ordinal) {
        Ok(Some(iface)) => iface,
        Ok(None) => {
            reader_log!(Level::Debug, "locator", "No interface at ordinal {}", ordinal);
            return Err(ReaderError::DriverNotPresent { ordinal });
        }
        Err(e) => {
            reader_log!(Level::Warn, "locator", "Enumerating ordinal {} failed: {}", ordinal, e);
            return Err(ReaderError::DriverNotPresent { ordinal });
        }
    };

    let path = detail_path(&set, &iface)?;
    reader_log!(Level::Debug, "locator", "Ordinal {} → {}", ordinal, path);
    Ok(path)
}

/// Paths of every present interface instance, in enumeration order.
///
/// An empty list means the class is known but no device is attached.
pub fn enumerate_device_paths<A: DeviceApi>(
    api: &A,
    class: &InterfaceClass,
) -> Result<Vec<DevicePath>> {
    let set = InterfaceSet::open(api, class).map_err(|e| {
        reader_log!(Level::Warn, "locator", "No enumeration set for {}: {}", class, e);
        ReaderError::DriverNotPresent { ordinal: 0 }
    })?;

    let mut paths = Vec::new();
    for ordinal in 0u32.. {
        match set.interface(class, ordinal) {
            Ok(Some(iface)) => paths.push(detail_path(&set, &iface)?),
            Ok(None) => break,
            Err(e) => {
                reader_log!(Level::Warn, "locator", "Enumerating ordinal {} failed: {}", ordinal, e);
                return Err(ReaderError::DriverNotPresent { ordinal });
            }
        }
    }

    reader_log!(Level::Debug, "locator", "{} interface(s) present for {}", paths.len(), class);
    Ok(paths)
}

/// Size query, exact-size allocation, fill, decode.
fn detail_path<A: DeviceApi>(set: &InterfaceSet<'_, A>, iface: &A::Interface) -> Result<DevicePath> {
    let required = set
        .detail_len(iface)
        .map_err(|e| ReaderError::PathResolutionFailed(format!("size query failed: {e}")))?;
    if required == 0 {
        return Err(ReaderError::PathResolutionFailed(
            "detail size reported as zero".into(),
        ));
    }

    let mut buf = vec![0u8; required];
    let written = set
        .detail(iface, &mut buf)
        .map_err(|e| ReaderError::PathResolutionFailed(format!("detail query failed: {e}")))?;
    if written > buf.len() {
        return Err(ReaderError::PathResolutionFailed(format!(
            "detail reported {written} bytes for a {required}-byte buffer"
        )));
    }

    parse_detail_path(&buf[..written])
}

/// Decode the path that follows the fixed header of a detail record.
pub fn parse_detail_path(detail: &[u8]) -> Result<DevicePath> {
    let body = match detail.get(DETAIL_HEADER_LEN..) {
        Some(body) if !body.is_empty() => body,
        _ => {
            return Err(ReaderError::PathResolutionFailed(format!(
                "{}-byte detail record holds no path",
                detail.len()
            )))
        }
    };

    let wide: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let end = wide.iter().position(|&unit| unit == 0).ok_or_else(|| {
        ReaderError::PathResolutionFailed("device path is not NUL-terminated".into())
    })?;
    if end == 0 {
        return Err(ReaderError::PathResolutionFailed("device path is empty".into()));
    }

    String::from_utf16(&wide[..end])
        .map(DevicePath::from)
        .map_err(|e| ReaderError::PathResolutionFailed(format!("device path is not UTF-16: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> Vec<u8> {
        let mut buf = 8u32.to_le_bytes().to_vec();
        for unit in path.encode_utf16().chain(Some(0)) {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        buf
    }

    #[test]
    fn parses_path_after_header() {
        let path = r"\\?\root#keyboard#0000#{39ad5308-66fc-11ea-bc55-0242ac130003}";
        let parsed = parse_detail_path(&record(path)).unwrap();
        assert_eq!(parsed.as_str(), path);
    }

    #[test]
    fn stops_at_first_terminator() {
        let mut buf = record("abc");
        buf.extend_from_slice(&[b'x', 0, b'y', 0]);
        assert_eq!(parse_detail_path(&buf).unwrap().as_str(), "abc");
    }

    #[test]
    fn rejects_header_only_record() {
        let err = parse_detail_path(&8u32.to_le_bytes()).unwrap_err();
        assert!(matches!(err, ReaderError::PathResolutionFailed(_)));
    }

    #[test]
    fn rejects_unterminated_path() {
        let mut buf = record("abc");
        buf.truncate(buf.len() - 2);
        let err = parse_detail_path(&buf).unwrap_err();
        assert!(matches!(err, ReaderError::PathResolutionFailed(_)));
    }

    #[test]
    fn rejects_empty_path() {
        let err = parse_detail_path(&record("")).unwrap_err();
        assert!(matches!(err, ReaderError::PathResolutionFailed(_)));
    }

    #[test]
    fn rejects_lone_surrogate() {
        let mut buf = 8u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&0xD800u16.to_le_bytes());
        buf.extend_from_slice(&[0, 0]);
        let err = parse_detail_path(&buf).unwrap_err();
        assert!(matches!(err, ReaderError::PathResolutionFailed(_)));
    }
}
