/// Wall-clock milliseconds since the Unix epoch.
///
/// The simulation never reads the clock itself; callers sample once per
/// tick and pass the value down so tests can drive time directly.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
