const MAX_DISCOVERY_CONCURRENCY: usize = 32;

pub const CONCURRENCY_ENV: &str = "AGENTSCAN_CONCURRENCY";

/// Files analyzed at once when nothing is configured
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_DISCOVERY_CONCURRENCY)
}

pub(crate) fn parse_concurrency(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_DISCOVERY_CONCURRENCY)
}

pub(crate) fn concurrency_from_env(default_value: usize) -> usize {
    let raw = std::env::var(CONCURRENCY_ENV).ok();
    parse_concurrency(raw.as_deref(), default_value)
}
