//! Proxy mesh controller: one entity's placeholder-vs-real display.
//!
//! ```text
//! Unloaded -> Loading -> {Loaded, Failed}
//! ```
//! Loaded and Failed are terminal for a source path. Assigning a new path
//! goes back to Unloaded and loads again. A failure never propagates to the
//! caller: the proxy keeps showing the placeholder.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use asset::{Mesh, MeshImporter, ObjImporter, placeholder_mesh};
use corelib::{Aabb, Transform, Vec3};

use crate::{
    config::ProxyConfig,
    events::{ListenerId, Listeners, ProxyEvent, ProxyEventKind},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

pub struct MeshProxy {
    source_path: PathBuf,
    state: LoadState,
    mesh: Option<Mesh>,
    proxy_mode: bool,
    volume: f32,
    normalized_scale: f32,
    attempts: u32,
    transform: Transform,
    importer: Box<dyn MeshImporter>,
    listeners: Listeners,
}

impl MeshProxy {
    /// Creates an unloaded proxy backed by the OBJ importer. Call [`load`](Self::load) to import.
    pub fn new(source_path: impl Into<PathBuf>, config: &ProxyConfig) -> Self {
        Self::with_importer(source_path, config, ObjImporter)
    }

    pub fn with_importer(
        source_path: impl Into<PathBuf>,
        config: &ProxyConfig,
        importer: impl MeshImporter + 'static,
    ) -> Self {
        let transform = Transform::from_trs(Vec3::ZERO, Vec3::ZERO, Vec3::splat(config.volume));
        Self {
            source_path: source_path.into(),
            state: LoadState::Unloaded,
            mesh: None,
            proxy_mode: config.start_in_proxy_mode,
            volume: config.volume,
            normalized_scale: 1.0,
            attempts: 0,
            transform,
            importer: Box::new(importer),
            listeners: Listeners::new(),
        }
    }

    /// Imports the source file if no attempt was made for the current path yet.
    ///
    /// Loaded and Failed are latched: calling again does not re-import.
    pub fn load(&mut self) -> LoadState {
        if self.state != LoadState::Unloaded {
            log::debug!(
                "{}: load skipped, already {:?}",
                self.source_path.display(),
                self.state
            );
            return self.state;
        }

        self.state = LoadState::Loading;
        self.attempts += 1;

        match self.importer.import(&self.source_path) {
            Ok(mesh) => {
                self.normalized_scale = normalized_scale(&mesh.bounds());
                self.state = LoadState::Loaded;
                log::info!(
                    "Loaded {} ({} vertices, {} triangles, normalized scale {:.4})",
                    self.source_path.display(),
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    self.normalized_scale
                );
                let mesh = self.mesh.insert(mesh);
                self.listeners.notify(&ProxyEvent::MeshLoaded {
                    path: &self.source_path,
                    mesh,
                });
            }
            Err(error) => {
                self.state = LoadState::Failed;
                log::error!(
                    "{} not able to be loaded: {}",
                    self.source_path.display(),
                    error
                );
                self.listeners.notify(&ProxyEvent::LoadFailed {
                    path: &self.source_path,
                    error: &error,
                });
            }
        }

        self.apply();
        self.state
    }

    /// Points the proxy at a new file, clears the failure latch and loads it.
    pub fn set_source_path(&mut self, source_path: impl Into<PathBuf>) -> LoadState {
        self.source_path = source_path.into();
        self.state = LoadState::Unloaded;
        self.mesh = None;
        self.normalized_scale = 1.0;
        self.attempts = 0;
        self.load()
    }

    pub fn set_proxy_mode(&mut self, active: bool) {
        self.proxy_mode = active;
        self.apply();
    }

    pub fn toggle_proxy_mode(&mut self) {
        self.set_proxy_mode(!self.proxy_mode);
    }

    /// Desired bounding volume; the placeholder is scaled by it directly,
    /// the real mesh by `volume * normalized_scale`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.apply();
    }

    /// Placeholder unless the real mesh is loaded and proxy mode is off.
    pub fn current_mesh(&self) -> &Mesh {
        match &self.mesh {
            Some(mesh) if self.showing_real() => mesh,
            _ => placeholder_mesh(),
        }
    }

    /// Unscaled bounds of [`current_mesh`](Self::current_mesh).
    pub fn bounding_box(&self) -> Aabb {
        self.current_mesh().bounds()
    }

    pub fn showing_real(&self) -> bool {
        !self.proxy_mode && self.state == LoadState::Loaded && self.mesh.is_some()
    }

    /// Bounds of the displayed mesh after the proxy's transform.
    pub fn world_bounds(&self) -> Aabb {
        self.bounding_box().transformed(&self.transform.matrix())
    }

    /// Placement set by the layout/grab layers; scale stays owned by the proxy.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    /// Euler angles in radians (XYZ order).
    pub fn set_rotation(&mut self, rotation_euler: Vec3) {
        self.transform.rotation_euler = rotation_euler;
    }

    pub fn display_scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Final path component, used as the entity's display name.
    pub fn name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_load_failed(&self) -> bool {
        self.state == LoadState::Failed
    }

    pub fn is_proxy_mode(&self) -> bool {
        self.proxy_mode
    }

    pub fn loaded_mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn normalized_scale(&self) -> f32 {
        self.normalized_scale
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Import attempts made for the current source path.
    pub fn attempt_count(&self) -> u32 {
        self.attempts
    }

    pub fn subscribe(
        &mut self,
        kind: ProxyEventKind,
        listener: impl FnMut(&ProxyEvent<'_>) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Recomputes the display scale and announces the current mesh.
    fn apply(&mut self) {
        let showing_real = self.showing_real();
        let scale = if showing_real {
            self.volume * self.normalized_scale
        } else {
            self.volume
        };
        self.transform.set_uniform_scale(scale);

        let mesh = match &self.mesh {
            Some(mesh) if showing_real => mesh,
            _ => placeholder_mesh(),
        };
        log::debug!(
            "{}: showing {} at scale {:.4}",
            self.source_path.display(),
            if showing_real { "mesh" } else { "placeholder" },
            scale
        );
        self.listeners.notify(&ProxyEvent::MeshChanged {
            mesh,
            showing_real,
            proxy_mode: self.proxy_mode,
            scale: self.transform.scale,
        });
    }
}

impl fmt::Debug for MeshProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshProxy")
            .field("source_path", &self.source_path)
            .field("state", &self.state)
            .field("proxy_mode", &self.proxy_mode)
            .field("volume", &self.volume)
            .field("normalized_scale", &self.normalized_scale)
            .field("listeners", &self.listeners)
            .finish()
    }
}

/// `max(size.normalize()) / max(size)`; 1.0 for a box without extent.
pub fn normalized_scale(bounds: &Aabb) -> f32 {
    let size = bounds.size();
    let largest = size.max_element();
    if !largest.is_finite() || largest <= f32::EPSILON {
        return 1.0;
    }
    size.normalize().max_element() / largest
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::ImportError;
    use corelib::vec3;
    use std::{cell::RefCell, io::Write, rc::Rc};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_obj(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    /// Counts import calls and always fails.
    struct FailingImporter(Rc<RefCell<u32>>);

    impl MeshImporter for FailingImporter {
        fn import(&self, path: &Path) -> Result<Mesh, ImportError> {
            *self.0.borrow_mut() += 1;
            Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    #[test]
    fn loads_real_mesh_and_shows_it_outside_proxy_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(&dir, "tri.obj", TRIANGLE);
        let mut proxy = MeshProxy::new(&path, &ProxyConfig::default());
        assert_eq!(proxy.load_state(), LoadState::Unloaded);

        assert_eq!(proxy.load(), LoadState::Loaded);
        assert!(proxy.is_proxy_mode());
        assert!(std::ptr::eq(proxy.current_mesh(), placeholder_mesh()));

        proxy.set_proxy_mode(false);
        assert!(proxy.showing_real());
        assert_eq!(proxy.current_mesh().triangles(), &[[0, 1, 2]]);
        assert_eq!(proxy.bounding_box().size(), vec3(1.0, 1.0, 0.0));
        assert_eq!(proxy.name(), "tri.obj");
    }

    #[test]
    fn nonexistent_path_falls_back_to_placeholder() {
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        assert_eq!(proxy.load(), LoadState::Failed);
        assert!(proxy.is_load_failed());
        assert!(proxy.loaded_mesh().is_none());
        assert!(std::ptr::eq(proxy.current_mesh(), placeholder_mesh()));
    }

    #[test]
    fn failure_overrides_requested_mode() {
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        proxy.load();
        proxy.set_proxy_mode(false);
        assert!(!proxy.showing_real());
        assert!(std::ptr::eq(proxy.current_mesh(), placeholder_mesh()));
        assert_eq!(proxy.display_scale(), Vec3::ONE);
    }

    #[test]
    fn failed_load_is_latched() {
        let calls = Rc::new(RefCell::new(0));
        let mut proxy = MeshProxy::with_importer(
            "broken.obj",
            &ProxyConfig::default(),
            FailingImporter(Rc::clone(&calls)),
        );
        proxy.load();
        proxy.load();
        assert_eq!(proxy.attempt_count(), 1);
        assert_eq!(*calls.borrow(), 1);

        proxy.set_source_path("other.obj");
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(proxy.attempt_count(), 1);
        assert!(proxy.is_load_failed());
    }

    #[test]
    fn load_failure_is_reported_once() {
        let failures = Rc::new(RefCell::new(Vec::new()));
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        let seen = Rc::clone(&failures);
        proxy.subscribe(ProxyEventKind::LoadFailed, move |event| {
            if let ProxyEvent::LoadFailed { path, error } = event {
                assert!(matches!(error, ImportError::FileNotFound { .. }));
                seen.borrow_mut().push(path.to_path_buf());
            }
        });
        proxy.load();
        proxy.load();
        proxy.set_proxy_mode(false);
        assert_eq!(*failures.borrow(), vec![PathBuf::from("/no/such/model.obj")]);
    }

    #[test]
    fn set_volume_in_proxy_mode_scales_placeholder_uniformly() {
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        proxy.set_volume(2.0);
        assert_eq!(proxy.display_scale(), Vec3::splat(2.0));
        assert_eq!(proxy.transform().scale, vec3(2.0, 2.0, 2.0));
    }

    #[test]
    fn real_mesh_scale_uses_normalized_scale() {
        let dir = tempfile::tempdir().unwrap();
        // 2 x 2 x 2 cube corners
        let path = write_obj(
            &dir,
            "cube.obj",
            "v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 1\nf 1 2 3 4\n",
        );
        let config = ProxyConfig {
            start_in_proxy_mode: false,
            ..ProxyConfig::default()
        };
        let mut proxy = MeshProxy::new(&path, &config);
        proxy.load();

        let expected = 1.0 / (2.0 * 3f32.sqrt());
        assert!((proxy.normalized_scale() - expected).abs() < 1e-6);
        proxy.set_volume(3.0);
        assert!((proxy.display_scale().x - 3.0 * expected).abs() < 1e-6);
        assert_eq!(proxy.display_scale().x, proxy.display_scale().z);
    }

    #[test]
    fn events_follow_load_then_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(&dir, "tri.obj", TRIANGLE);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut proxy = MeshProxy::new(&path, &ProxyConfig::default());
        for kind in [ProxyEventKind::MeshLoaded, ProxyEventKind::MeshChanged] {
            let log = Rc::clone(&log);
            proxy.subscribe(kind, move |event| {
                let entry = match event {
                    ProxyEvent::MeshLoaded { mesh, .. } => format!("loaded:{}", mesh.triangle_count()),
                    ProxyEvent::MeshChanged { showing_real, .. } => format!("changed:{showing_real}"),
                    ProxyEvent::LoadFailed { .. } => "failed".to_string(),
                };
                log.borrow_mut().push(entry);
            });
        }

        proxy.load();
        proxy.toggle_proxy_mode();
        proxy.toggle_proxy_mode();
        assert_eq!(
            *log.borrow(),
            vec!["loaded:1", "changed:false", "changed:true", "changed:false"]
        );
    }

    #[test]
    fn resetting_source_path_replaces_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let tri = write_obj(&dir, "tri.obj", TRIANGLE);
        let quad = write_obj(&dir, "quad.obj", "v 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\nf 1 2 3 4\n");
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        proxy.load();
        assert!(proxy.is_load_failed());

        assert_eq!(proxy.set_source_path(&tri), LoadState::Loaded);
        assert!(!proxy.is_load_failed());
        assert_eq!(proxy.loaded_mesh().map(Mesh::triangle_count), Some(1));

        proxy.set_source_path(&quad);
        assert_eq!(proxy.loaded_mesh().map(Mesh::triangle_count), Some(2));
        assert_eq!(proxy.source_path(), quad.as_path());
    }

    #[test]
    fn world_bounds_follow_placement_and_scale() {
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        proxy.load();
        proxy.set_volume(2.0);
        proxy.set_position(vec3(0.0, 5.0, 0.0));
        proxy.set_rotation(vec3(0.0, std::f32::consts::FRAC_PI_2, 0.0));

        let bounds = proxy.world_bounds();
        assert!((bounds.center() - vec3(0.0, 5.0, 0.0)).length() < 1e-2);
        assert!((bounds.max_extent() - 2.0).abs() < 1e-2);
        // scale changes never move the proxy
        proxy.set_proxy_mode(false);
        assert_eq!(proxy.transform().translation, vec3(0.0, 5.0, 0.0));
    }

    #[test]
    fn flat_and_empty_boxes() {
        let flat = Aabb::new(Vec3::ZERO, vec3(1.0, 1.0, 0.0));
        assert!((normalized_scale(&flat) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(normalized_scale(&Aabb::default()), 1.0);
    }
}
