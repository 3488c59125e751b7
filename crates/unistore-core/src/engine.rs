//! Process-wide initialisation of the native storage engine.
//!
//! The engine is linked statically, but its one-time setup (platform
//! selection, version banner) still happens lazily on the first native
//! operator construction and is never repeated or reset.

use std::sync::OnceLock;

use tracing::info;

use crate::platform;

/// Description of the loaded engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Engine name
    pub name: &'static str,
    /// Platform selector the engine was initialised for
    pub platform: String,
}

static ENGINE: OnceLock<EngineInfo> = OnceLock::new();

/// Initialise the engine if it has not been initialised yet.
///
/// The first caller's platform override (or the auto-detected platform) is
/// recorded; later calls return the same info regardless of their override.
pub fn ensure_loaded(platform_override: Option<&str>) -> &'static EngineInfo {
    ENGINE.get_or_init(|| {
        let platform = platform_override
            .map(str::to_string)
            .unwrap_or_else(platform::current);
        info!("Initialised object_store engine for platform {}", platform);
        EngineInfo {
            name: "object_store",
            platform,
        }
    })
}
