//! Proxy mesh lifecycle.
//!
//! A [`MeshProxy`] shows a shared placeholder sphere until its OBJ source is
//! imported and proxy mode is switched off. Load failures are latched and
//! masked by the placeholder. [`ProxyWorld`] keeps one proxy per source
//! path and [`DirectoryWatcher`] keeps that set in step with a directory.

pub mod collider;
pub mod config;
pub mod controller;
pub mod events;
pub mod watch;
pub mod world;

pub use collider::{ActiveCollider, BoxCollider, ColliderSet, attach_colliders};
pub use config::ProxyConfig;
pub use controller::{LoadState, MeshProxy};
pub use events::{ListenerId, ProxyEvent, ProxyEventKind};
pub use watch::DirectoryWatcher;
pub use world::{Entity, ProxyWorld, SyncReport};
