//! Scene graph - owned mesh storage plus the set of attached children

use std::collections::BTreeMap;

use crate::types::{Mesh, ObjectId};

/// Renderable objects for a frame.
///
/// Meshes are stored independently of attachment so a mesh can leave the
/// scene (e.g. when an immersive session ends) and come back later with its
/// transform intact.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: BTreeMap<ObjectId, Mesh>,
    children: Vec<ObjectId>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a mesh without attaching it
    pub fn insert(&mut self, mesh: Mesh) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    /// Attach a stored mesh. Attaching twice keeps a single instance.
    ///
    /// Returns true if the scene changed.
    pub fn add(&mut self, id: ObjectId) -> bool {
        if !self.meshes.contains_key(&id) || self.children.contains(&id) {
            return false;
        }
        self.children.push(id);
        true
    }

    /// Detach a mesh, keeping it in storage
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.children.len();
        self.children.retain(|&child| child != id);
        self.children.len() != before
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.children.contains(&id)
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub fn mesh(&self, id: ObjectId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn mesh_mut(&mut self, id: ObjectId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    /// Attached meshes in attachment order
    pub fn visible_meshes(&self) -> impl Iterator<Item = (ObjectId, &Mesh)> {
        self.children
            .iter()
            .filter_map(|&id| self.meshes.get(&id).map(|mesh| (id, mesh)))
    }

    /// Drop every mesh and attachment
    pub fn clear(&mut self) {
        self.children.clear();
        self.meshes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoxGeometry, Material};

    fn cube() -> Mesh {
        Mesh::new(BoxGeometry::default(), Material::solid(0x00ff00))
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut scene = Scene::new();
        let id = scene.insert(cube());
        assert!(scene.children().is_empty());

        assert!(scene.add(id));
        assert!(!scene.add(id));
        assert_eq!(scene.children(), &[id]);
    }

    #[test]
    fn test_remove_keeps_storage() {
        let mut scene = Scene::new();
        let id = scene.insert(cube());
        scene.add(id);
        scene.mesh_mut(id).unwrap().transform.rotation.x = 1.0;

        assert!(scene.remove(id));
        assert!(!scene.remove(id));
        assert!(!scene.contains(id));
        assert_eq!(scene.mesh(id).unwrap().transform.rotation.x, 1.0);

        scene.add(id);
        assert_eq!(scene.visible_meshes().count(), 1);
    }

    #[test]
    fn test_unknown_id_cannot_be_added() {
        let mut scene = Scene::new();
        assert!(!scene.add(ObjectId(42)));
    }

    #[test]
    fn test_clear() {
        let mut scene = Scene::new();
        let id = scene.insert(cube());
        scene.add(id);
        scene.clear();
        assert!(scene.mesh(id).is_none());
        assert!(scene.children().is_empty());
    }
}
