//! Settings shared by every proxy a world spawns.

/// Defaults applied to newly created proxies and to the directory watcher.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyConfig {
    /// Desired bounding volume (uniform display scale basis).
    pub volume: f32,
    /// New proxies show the placeholder until told otherwise.
    pub start_in_proxy_mode: bool,
    /// File extension the watcher picks up, without the dot.
    pub extension: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            start_in_proxy_mode: true,
            extension: "obj".to_string(),
        }
    }
}
