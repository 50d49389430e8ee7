//! Collider bookkeeping for grabbable proxies.
//!
//! A sphere collider stands in for the placeholder; once the real mesh is
//! loaded a box collider sized to its bounds takes over whenever the real
//! mesh is shown.

use std::{cell::RefCell, rc::Rc};

use asset::Mesh;
use corelib::Vec3;

use crate::{
    controller::MeshProxy,
    events::{ProxyEvent, ProxyEventKind},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCollider {
    pub center: Vec3,
    pub size: Vec3,
    pub enabled: bool,
}

/// Which collider currently takes part in hit tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveCollider {
    Sphere,
    Box,
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColliderSet {
    pub sphere_enabled: bool,
    pub box_collider: Option<BoxCollider>,
}

impl Default for ColliderSet {
    fn default() -> Self {
        Self {
            sphere_enabled: true,
            box_collider: None,
        }
    }
}

impl ColliderSet {
    /// Builds the (disabled) box collider from the mesh bounds.
    pub fn on_mesh_loaded(&mut self, mesh: &Mesh) {
        let bounds = mesh.bounds();
        self.box_collider = Some(BoxCollider {
            center: bounds.center(),
            size: bounds.size(),
            enabled: false,
        });
    }

    pub fn on_mesh_changed(&mut self, showing_real: bool) {
        self.sphere_enabled = !showing_real;
        if let Some(collider) = self.box_collider.as_mut() {
            collider.enabled = showing_real;
        }
    }

    pub fn active(&self) -> ActiveCollider {
        match self.box_collider {
            Some(BoxCollider { enabled: true, .. }) => ActiveCollider::Box,
            _ if self.sphere_enabled => ActiveCollider::Sphere,
            _ => ActiveCollider::None,
        }
    }
}

/// Subscribes a fresh [`ColliderSet`] to the proxy's load/change events.
///
/// Attach before the first [`MeshProxy::load`] so the box collider is built.
pub fn attach_colliders(proxy: &mut MeshProxy) -> Rc<RefCell<ColliderSet>> {
    let colliders = Rc::new(RefCell::new(ColliderSet::default()));

    let on_loaded = Rc::clone(&colliders);
    proxy.subscribe(ProxyEventKind::MeshLoaded, move |event| {
        if let ProxyEvent::MeshLoaded { mesh, .. } = event {
            on_loaded.borrow_mut().on_mesh_loaded(mesh);
        }
    });

    let on_changed = Rc::clone(&colliders);
    proxy.subscribe(ProxyEventKind::MeshChanged, move |event| {
        if let ProxyEvent::MeshChanged { showing_real, .. } = event {
            on_changed.borrow_mut().on_mesh_changed(*showing_real);
        }
    });

    colliders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use corelib::vec3;
    use std::io::Write;

    #[test]
    fn colliders_follow_displayed_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wedge.obj");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"v 0 0 0\nv 2 0 0\nv 0 1 0\nv 0 0 4\nf 1 2 3\nf 1 3 4\n")
            .unwrap();

        let mut proxy = MeshProxy::new(&path, &ProxyConfig::default());
        let colliders = attach_colliders(&mut proxy);
        proxy.load();

        {
            let set = colliders.borrow();
            let boxed = set.box_collider.expect("box collider after load");
            assert_eq!(boxed.size, vec3(2.0, 1.0, 4.0));
            assert_eq!(boxed.center, vec3(1.0, 0.5, 2.0));
            assert_eq!(set.active(), ActiveCollider::Sphere);
        }

        proxy.set_proxy_mode(false);
        assert_eq!(colliders.borrow().active(), ActiveCollider::Box);
        assert!(!colliders.borrow().sphere_enabled);

        proxy.toggle_proxy_mode();
        assert_eq!(colliders.borrow().active(), ActiveCollider::Sphere);
    }

    #[test]
    fn failed_proxy_keeps_sphere() {
        let mut proxy = MeshProxy::new("/no/such/model.obj", &ProxyConfig::default());
        let colliders = attach_colliders(&mut proxy);
        proxy.load();
        proxy.set_proxy_mode(false);
        assert!(colliders.borrow().box_collider.is_none());
        assert_eq!(colliders.borrow().active(), ActiveCollider::Sphere);
    }
}
