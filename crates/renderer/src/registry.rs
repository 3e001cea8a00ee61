//! Resource registry.
//!
//! Meshes and materials live in flat growable arenas indexed by integer
//! handles. Handles stay stable for the registry's lifetime: removing an
//! entry empties its slot but never shifts or reuses indices, so a handle
//! can never silently point at a different resource. Cross-references
//! (submesh to material) are stored as the raw index, which keeps teardown
//! order irrelevant.

use crate::material::Material;
use crate::mesh::Mesh;

/// Stable handle to a [`Mesh`] in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Stable handle to a [`Material`] in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Growable slot arena with stable integer indices.
///
/// Slots are never reused; a removed entry leaves a permanent hole. The
/// registries here hold at most a few hundred entries, so the holes cost
/// nothing worth a generation scheme.
struct Arena<T> {
    slots: Vec<Option<T>>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn insert(&mut self, value: T) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Some(value));
        index
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    fn remove(&mut self, index: u32) -> Option<T> {
        self.slots.get_mut(index as usize).and_then(Option::take)
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Arenas for the renderer's long-lived resources.
///
/// The registry owns meshes and materials; the renderer resolves handles
/// at draw time and treats a missing entry as a caller error.
pub struct Registry {
    meshes: Arena<Mesh>,
    materials: Arena<Material>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            meshes: Arena::new(),
            materials: Arena::new(),
        }
    }

    /// Adds a mesh and returns its stable handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        MeshHandle(self.meshes.insert(mesh))
    }

    /// Looks up a mesh by handle.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    /// Removes a mesh, dropping its GPU buffers.
    ///
    /// The caller must ensure no in-flight frame still references it.
    pub fn remove_mesh(&mut self, handle: MeshHandle) -> Option<Mesh> {
        self.meshes.remove(handle.0)
    }

    /// Adds a material and returns its stable handle.
    ///
    /// The handle's index is what submeshes store as their material
    /// reference.
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        MaterialHandle(self.materials.insert(material))
    }

    /// Looks up a material by handle.
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    /// Looks up a material by raw index, as stored on a submesh.
    pub fn material_by_index(&self, index: u32) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Removes a material, dropping its texture and descriptor set.
    ///
    /// The caller must ensure no in-flight frame still references it.
    pub fn remove_material(&mut self, handle: MaterialHandle) -> Option<Material> {
        self.materials.remove(handle.0)
    }

    /// Returns the number of live meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Returns the number of live materials.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_handles_are_sequential() {
        let mut arena = Arena::new();
        assert_eq!(arena.insert("a"), 0);
        assert_eq!(arena.insert("b"), 1);
        assert_eq!(arena.insert("c"), 2);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn arena_get_returns_inserted_value() {
        let mut arena = Arena::new();
        let index = arena.insert(42);
        assert_eq!(arena.get(index), Some(&42));
    }

    #[test]
    fn arena_handles_stay_stable_after_remove() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let c = arena.insert("c");

        assert_eq!(arena.remove(b), Some("b"));

        // Neighbors keep their indices, the hole stays empty
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), None);
        assert_eq!(arena.get(c), Some(&"c"));

        // New inserts never reuse the vacated slot
        let d = arena.insert("d");
        assert_eq!(d, 3);
        assert_eq!(arena.get(b), None);
    }

    #[test]
    fn arena_out_of_range_is_none() {
        let arena: Arena<u32> = Arena::new();
        assert_eq!(arena.get(0), None);
    }

    #[test]
    fn arena_double_remove_is_none() {
        let mut arena = Arena::new();
        let index = arena.insert(1);
        assert_eq!(arena.remove(index), Some(1));
        assert_eq!(arena.remove(index), None);
    }
}
