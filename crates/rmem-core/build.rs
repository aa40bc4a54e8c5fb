//! Build script for rmem-core
//!
//! This script checks system requirements before compilation:
//! - Minimum Rust version (`usize::wrapping_add_signed` needs Rust 1.66.0+)
//! - Target operating system (only Linux/Android, macOS/iOS and Windows have a
//!   native transfer primitive)
//!
//! ## Requirements
//!
//! - **Rust**: 1.66.0 or newer
//! - **Linux**: kernel 3.2+ (`process_vm_readv` / `process_vm_writev`)
//! - **macOS**: any version shipping `mach_vm_read_overwrite`
//! - **Windows**: any version shipping `ReadProcessMemory`

use std::env;

const SUPPORTED_OPERATING_SYSTEMS: &[&str] = &["linux", "android", "macos", "ios", "windows"];

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 66, 0);

        if rustc_version < min_rust_version {
            panic!(
                "rmem-core requires Rust {} or newer, found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }

    // Cargo sets CARGO_CFG_TARGET_OS for the target, not the host, so this also
    // works when cross-compiling.
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if !SUPPORTED_OPERATING_SYSTEMS.contains(&target_os.as_str()) {
        println!(
            "cargo:warning=rmem-core has no native memory transfer primitive for target os `{}`",
            target_os
        );
    }
}
