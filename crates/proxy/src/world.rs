//! Registry of proxy entities, keyed by source path for the directory watcher.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
};

use crate::{config::ProxyConfig, controller::MeshProxy};

/// Entity id, handed out in increasing order. Ids are never reused.
pub type Entity = u32;

/// Runs on every new proxy before its first load (e.g. to attach listeners).
pub type SpawnHook = Box<dyn FnMut(Entity, &mut MeshProxy)>;

/// Outcome of [`ProxyWorld::sync_with_listing`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<Entity>,
    pub removed: Vec<PathBuf>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Default)]
pub struct ProxyWorld {
    proxies: BTreeMap<Entity, MeshProxy>,
    next_id: Entity,
    config: ProxyConfig,
    on_spawn: Option<SpawnHook>,
}

impl ProxyWorld {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            proxies: BTreeMap::new(),
            next_id: 0,
            config,
            on_spawn: None,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn set_spawn_hook(&mut self, hook: impl FnMut(Entity, &mut MeshProxy) + 'static) {
        self.on_spawn = Some(Box::new(hook));
    }

    /// Creates a proxy for `path` and loads it right away.
    pub fn create_proxy_entity(&mut self, path: impl Into<PathBuf>) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        let mut proxy = MeshProxy::new(path, &self.config);
        if let Some(hook) = self.on_spawn.as_mut() {
            hook(id, &mut proxy);
        }
        proxy.load();
        log::info!("Spawned proxy {} for {}", id, proxy.source_path().display());
        self.proxies.insert(id, proxy);
        id
    }

    /// Returns `false` if the entity was not alive.
    pub fn destroy_proxy_entity(&mut self, e: Entity) -> bool {
        match self.proxies.remove(&e) {
            Some(proxy) => {
                log::info!("Destroyed proxy {} ({})", e, proxy.source_path().display());
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        self.proxies.contains_key(&e)
    }

    pub fn get(&self, e: Entity) -> Option<&MeshProxy> {
        self.proxies.get(&e)
    }

    pub fn get_mut(&mut self, e: Entity) -> Option<&mut MeshProxy> {
        self.proxies.get_mut(&e)
    }

    /// Inspector action. Returns `false` if the entity was not alive.
    pub fn toggle_proxy_mode(&mut self, e: Entity) -> bool {
        match self.get_mut(e) {
            Some(proxy) => {
                proxy.toggle_proxy_mode();
                true
            }
            None => false,
        }
    }

    pub fn find_by_path(&self, path: &Path) -> Option<Entity> {
        self.iter()
            .find(|(_, proxy)| proxy.source_path() == path)
            .map(|(e, _)| e)
    }

    pub fn list_active_paths(&self) -> BTreeSet<PathBuf> {
        self.iter()
            .map(|(_, proxy)| proxy.source_path().to_path_buf())
            .collect()
    }

    /// Iterate over live (Entity, MeshProxy) pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &MeshProxy)> {
        self.proxies.iter().map(|(e, p)| (*e, p))
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Spawns proxies for new paths and destroys proxies whose path is gone.
    pub fn sync_with_listing<I>(&mut self, listing: I) -> SyncReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let listing: BTreeSet<PathBuf> = listing.into_iter().collect();
        let mut report = SyncReport::default();

        let gone: Vec<Entity> = self
            .iter()
            .filter(|(_, proxy)| !listing.contains(proxy.source_path()))
            .map(|(e, _)| e)
            .collect();
        for e in gone {
            if let Some(path) = self.get(e).map(|p| p.source_path().to_path_buf()) {
                self.destroy_proxy_entity(e);
                report.removed.push(path);
            }
        }

        let active = self.list_active_paths();
        for path in listing.into_iter().filter(|p| !active.contains(p)) {
            report.added.push(self.create_proxy_entity(path));
        }

        report
    }
}

impl fmt::Debug for ProxyWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyWorld")
            .field("alive", &self.len())
            .field("next_id", &self.next_id)
            .field("config", &self.config)
            .finish()
    }
}
