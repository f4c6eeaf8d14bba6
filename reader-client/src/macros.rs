/// Logs a line tagged with the component that produced it.
/// Usage:
/// ```ignore
/// use log::Level;
/// rfid_reader::reader_log!(Level::Info, "locator", "Resolved {} device(s)", 2);
/// ```
/// The host's `fern` formatter adds timestamp, level, pid and tid, so a
/// record ends up as:
/// [2025-04-25T16:32:10+02:00][DEBUG][rfid_reader::comms::locator][pid=4568][tid=ThreadId(1)] [locator] Resolved 2 device(s)
#[macro_export]
macro_rules! reader_log {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        log::log!(
            $level,
            concat!("[", $component, "] ", $fmt)
            $(, $($arg)+)?
        );
    };
}

#[cfg(test)]
mod tests {
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct Capture;

    impl Log for Capture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }
        fn log(&self, record: &Record) {
            LINES.lock().unwrap().push(record.args().to_string());
        }
        fn flush(&self) {}
    }

    #[test]
    fn reader_log_prefixes_component() {
        log::set_logger(&Capture).unwrap();
        log::set_max_level(LevelFilter::Debug);

        reader_log!(Level::Debug, "ioctl", "{} byte(s) from {}", 3, "#0");
        reader_log!(Level::Trace, "ioctl", "below max level");

        let lines = LINES.lock().unwrap();
        assert!(lines.iter().any(|l| l == "[ioctl] 3 byte(s) from #0"), "{lines:?}");
        assert!(lines.iter().all(|l| !l.contains("below max level")), "{lines:?}");
    }
}
