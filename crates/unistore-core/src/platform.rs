//! Platform detection for selecting the engine build.

/// Selector used when the OS/architecture pair is not recognised.
pub const FALLBACK_PLATFORM: &str = "generic";

/// Map an OS name and CPU architecture to an engine selector string.
///
/// Accepts both Rust target names (`linux`, `macos`, `x86_64`, `aarch64`) and
/// the common JVM/uname spellings (`Mac OS X`, `amd64`, `arm64`). Never fails;
/// unknown pairs map to [`FALLBACK_PLATFORM`].
pub fn auto_detect(os: &str, arch: &str) -> String {
    let os = os.trim().to_lowercase();
    let arch = arch.trim().to_lowercase();

    let os = if os.starts_with("linux") {
        "linux"
    } else if os.starts_with("mac") || os.starts_with("darwin") {
        "osx"
    } else if os.starts_with("windows") {
        "windows"
    } else if os.starts_with("freebsd") {
        "freebsd"
    } else {
        return FALLBACK_PLATFORM.to_string();
    };

    let arch = match arch.as_str() {
        "x86_64" | "amd64" | "x64" => "x86_64",
        "aarch64" | "arm64" => "aarch_64",
        _ => return FALLBACK_PLATFORM.to_string(),
    };

    format!("{}-{}", os, arch)
}

/// The selector for the running process.
pub fn current() -> String {
    auto_detect(std::env::consts::OS, std::env::consts::ARCH)
}
