//! 日志初始化
//!
//! 使用 `tracing-subscriber`，级别由 `RUST_LOG` 控制（默认 info）

use tracing_subscriber::EnvFilter;

/// 初始化全局日志（重复调用无副作用）
pub fn init() {
    init_with_verbose(false);
}

/// 初始化全局日志；`verbose` 为真且未设置 `RUST_LOG` 时使用 debug 级别
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
