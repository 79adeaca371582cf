//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stockbook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("stockbook_core ping={}", stockbook_core::ping());
    println!("stockbook_core version={}", stockbook_core::core_version());
}
