//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `rewise_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("rewise_core ping={}", rewise_core::ping());
    println!("rewise_core version={}", rewise_core::core_version());
}
