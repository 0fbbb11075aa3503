/// Config of a container
/// ## Fields
/// - `eager_init`:
///   If `true`, bootstrap builds every scoped class in registration order before the main class,
///   so misconfigured classes fail at mod load instead of on first use.
///
///   Transient classes are never built ahead of time.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub eager_init: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { eager_init: true }
    }
}
