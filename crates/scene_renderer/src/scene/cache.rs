//! Per-primitive GPU resource cache

use std::collections::HashMap;
use std::rc::Rc;

use crate::assets::{AssetResult, PrimitiveId, SceneAsset};
use crate::geometry::extract_primitive;
use crate::render::device::GraphicsDevice;
use crate::render::{DrawableBinding, GeometryRecord, Material, ShaderProgram};

/// Uploads each source primitive at most once.
///
/// Geometry and drawables are keyed by [`PrimitiveId`]; every request for an
/// already seen primitive returns the same `Rc`. Nothing is evicted: the cache
/// lives as long as the scene built from it.
#[derive(Debug, Default)]
pub struct ResourceCache {
    geometries: HashMap<PrimitiveId, Rc<GeometryRecord>>,
    drawables: HashMap<PrimitiveId, Rc<DrawableBinding>>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploaded geometry for a primitive, extracting and uploading on first use
    pub fn get_or_create_geometry(
        &mut self,
        device: &mut dyn GraphicsDevice,
        asset: &SceneAsset,
        id: PrimitiveId,
    ) -> AssetResult<Rc<GeometryRecord>> {
        if let Some(geometry) = self.geometries.get(&id) {
            log::debug!("Geometry cache hit for {}/{}", id.mesh, id.primitive);
            return Ok(Rc::clone(geometry));
        }

        let extracted = extract_primitive(asset.primitive(id)?, id)?;
        let geometry = Rc::new(GeometryRecord::upload(device, &extracted));
        self.geometries.insert(id, Rc::clone(&geometry));
        Ok(geometry)
    }

    /// Drawable for a primitive, shaded with `program` when first created
    pub fn get_or_create_drawable(
        &mut self,
        device: &mut dyn GraphicsDevice,
        asset: &SceneAsset,
        id: PrimitiveId,
        program: &Rc<ShaderProgram>,
    ) -> AssetResult<Rc<DrawableBinding>> {
        if let Some(drawable) = self.drawables.get(&id) {
            return Ok(Rc::clone(drawable));
        }

        let geometry = self.get_or_create_geometry(device, asset, id)?;
        let material = match asset.primitive(id)?.material {
            Some(index) => Material::from_asset(asset.material(index)?),
            None => Material::default(),
        };

        let drawable = Rc::new(DrawableBinding::new(geometry, Rc::clone(program), material));
        self.drawables.insert(id, Rc::clone(&drawable));
        Ok(drawable)
    }

    /// Number of distinct uploaded primitives
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of distinct drawables
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }

    /// Release every GPU buffer and empty the cache
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.drawables.clear();
        for (_, geometry) in self.geometries.drain() {
            geometry.destroy(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetMesh, AssetPrimitive, AssetError};
    use crate::render::{RecordingDevice, ShaderLibrary, ShaderSources};

    fn triangle() -> AssetPrimitive {
        AssetPrimitive {
            positions: Some(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            ..AssetPrimitive::default()
        }
    }

    fn asset() -> SceneAsset {
        SceneAsset {
            meshes: vec![AssetMesh {
                name: None,
                primitives: vec![triangle(), triangle()],
            }],
            ..SceneAsset::default()
        }
    }

    #[test]
    fn test_same_primitive_shares_resources() {
        let mut device = RecordingDevice::new();
        let library = ShaderLibrary::new(&mut device, &ShaderSources::default()).unwrap();
        let asset = asset();
        let mut cache = ResourceCache::new();
        let id = PrimitiveId::new(0, 0);

        let a = cache.get_or_create_drawable(&mut device, &asset, id, &library.lit).unwrap();
        let b = cache.get_or_create_drawable(&mut device, &asset, id, &library.lit).unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&a.geometry, &b.geometry));
        assert!(Rc::ptr_eq(&a.geometry, &cache.get_or_create_geometry(&mut device, &asset, id).unwrap()));
        assert_eq!(device.live_buffer_count(), 2);
    }

    #[test]
    fn test_distinct_primitives_never_share() {
        let mut device = RecordingDevice::new();
        let library = ShaderLibrary::new(&mut device, &ShaderSources::default()).unwrap();
        let asset = asset();
        let mut cache = ResourceCache::new();

        let a = cache
            .get_or_create_drawable(&mut device, &asset, PrimitiveId::new(0, 0), &library.lit)
            .unwrap();
        let b = cache
            .get_or_create_drawable(&mut device, &asset, PrimitiveId::new(0, 1), &library.lit)
            .unwrap();

        assert!(!Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a.geometry, &b.geometry));
        assert_eq!(cache.geometry_count(), 2);
        assert_eq!(cache.drawable_count(), 2);
    }

    #[test]
    fn test_unknown_primitive_is_an_error() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new();

        let result = cache.get_or_create_geometry(&mut device, &asset(), PrimitiveId::new(4, 0));
        assert_eq!(result, Err(AssetError::InvalidReference { kind: "mesh", index: 4 }));
    }

    #[test]
    fn test_destroy_releases_buffers() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new();
        let asset = asset();
        cache.get_or_create_geometry(&mut device, &asset, PrimitiveId::new(0, 0)).unwrap();
        cache.get_or_create_geometry(&mut device, &asset, PrimitiveId::new(0, 1)).unwrap();

        cache.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(cache.geometry_count(), 0);
    }
}
