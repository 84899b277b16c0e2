// Imports
use crate::camera::Camera;
use crate::fill;
use crate::{CanvasConfig, CanvasError, CanvasItem, Layer};
use oofcanvas_compose::ext::OptionAabbExt;
use oofcanvas_compose::{Color, Coord};
use p2d::bounding_volume::Aabb;
use slotmap::{HopSlotMap, SecondaryMap};
use std::io::Write;
use tracing::warn;

slotmap::new_key_type! {
    /// Identifies a item on a canvas.
    pub struct ItemKey;
    /// Identifies a layer on a canvas.
    pub struct LayerKey;
}

/// The off-screen canvas.
///
/// Holds the items, the layers they are placed on and the transform from user coordinates to pixels.
/// Layers are drawn in order, the first layer at the bottom.
#[derive(Debug)]
pub struct Canvas {
    config: CanvasConfig,
    camera: Camera,
    items: HopSlotMap<ItemKey, CanvasItem>,
    /// The layer each item is placed on.
    item_layers: SecondaryMap<ItemKey, LayerKey>,
    /// Items that additionally stroke their bounds, with the color and line width in pixels.
    item_draw_bounds: SecondaryMap<ItemKey, (Color, f64)>,
    layers: HopSlotMap<LayerKey, Layer>,
    /// The drawing order. Layers that are not part of the order belong to a view.
    layer_order: Vec<LayerKey>,
}

impl Canvas {
    pub fn new(ppu: f64) -> Result<Self, CanvasError> {
        Self::from_config(CanvasConfig {
            ppu,
            ..Default::default()
        })
    }

    pub fn from_config(config: CanvasConfig) -> Result<Self, CanvasError> {
        let camera = Camera::new(config.ppu)?;
        Ok(Self {
            config: CanvasConfig {
                background_color: config.background_color.opaque(),
                ..config
            },
            camera,
            items: HopSlotMap::with_key(),
            item_layers: SecondaryMap::new(),
            item_draw_bounds: SecondaryMap::new(),
            layers: HopSlotMap::with_key(),
            layer_order: Vec::new(),
        })
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    // Layers

    /// Adds a new layer on top of all others.
    ///
    /// Layer names should be unique, a duplicate is accepted but [Self::layer_by_name] only finds the first.
    pub fn new_layer(&mut self, name: impl Into<String>) -> LayerKey {
        let name = name.into();
        if self.layer_by_name(&name).is_ok() {
            warn!("A layer with name \"{name}\" already exists");
        }
        let key = self.layers.insert(Layer::new(name));
        self.layer_order.push(key);
        key
    }

    /// A layer that is not part of the drawing order, drawn separately on top by a view.
    pub(crate) fn new_detached_layer(&mut self, name: impl Into<String>) -> LayerKey {
        self.layers.insert(Layer::new(name))
    }

    /// Removes the layer and all items on it.
    pub fn delete_layer(&mut self, key: LayerKey) -> Result<(), CanvasError> {
        let mut layer = self.layers.remove(key).ok_or(CanvasError::InvalidLayerKey)?;
        for item_key in layer.clear() {
            self.forget_item(item_key);
        }
        self.layer_order.retain(|k| *k != key);
        Ok(())
    }

    pub fn layer(&self, key: LayerKey) -> Option<&Layer> {
        self.layers.get(key)
    }

    pub fn layer_mut(&mut self, key: LayerKey) -> Option<&mut Layer> {
        self.layers.get_mut(key)
    }

    /// The first layer in drawing order with the name.
    pub fn layer_by_name(&self, name: &str) -> Result<LayerKey, CanvasError> {
        self.layer_order
            .iter()
            .copied()
            .find(|k| self.layers.get(*k).is_some_and(|l| l.name() == name))
            .ok_or_else(|| CanvasError::LayerNotFound(name.to_string()))
    }

    pub fn layer_at(&self, index: usize) -> Result<LayerKey, CanvasError> {
        self.layer_order
            .get(index)
            .copied()
            .ok_or(CanvasError::LayerIndexOutOfRange {
                index,
                len: self.layer_order.len(),
            })
    }

    /// The position of the layer in the drawing order, 0 being the bottom.
    pub fn layer_index(&self, key: LayerKey) -> Option<usize> {
        self.layer_order.iter().position(|k| *k == key)
    }

    pub fn n_layers(&self) -> usize {
        self.layer_order.len()
    }

    /// The layer keys in drawing order.
    pub fn layer_keys(&self) -> &[LayerKey] {
        &self.layer_order
    }

    /// The layers in drawing order.
    pub fn layers(&self) -> impl Iterator<Item = (LayerKey, &Layer)> + '_ {
        self.layer_order
            .iter()
            .filter_map(|k| self.layers.get(*k).map(|l| (*k, l)))
    }

    fn check_index(&self, index: usize) -> Result<(), CanvasError> {
        if index < self.layer_order.len() {
            Ok(())
        } else {
            Err(CanvasError::LayerIndexOutOfRange {
                index,
                len: self.layer_order.len(),
            })
        }
    }

    fn key_index(&self, key: LayerKey) -> Result<usize, CanvasError> {
        self.layer_index(key).ok_or(CanvasError::InvalidLayerKey)
    }

    /// Moves the layer at the index up by `howfar` positions, stopping at the top.
    pub fn raise_layer(&mut self, index: usize, howfar: usize) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let target = index
            .saturating_add(howfar)
            .min(self.layer_order.len() - 1);
        let key = self.layer_order.remove(index);
        self.layer_order.insert(target, key);
        Ok(())
    }

    /// Moves the layer at the index down by `howfar` positions, stopping at the bottom.
    pub fn lower_layer(&mut self, index: usize, howfar: usize) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let target = index.saturating_sub(howfar);
        let key = self.layer_order.remove(index);
        self.layer_order.insert(target, key);
        Ok(())
    }

    pub fn raise_layer_to_top(&mut self, index: usize) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let key = self.layer_order.remove(index);
        self.layer_order.push(key);
        Ok(())
    }

    pub fn lower_layer_to_bottom(&mut self, index: usize) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let key = self.layer_order.remove(index);
        self.layer_order.insert(0, key);
        Ok(())
    }

    pub fn raise_layer_by(&mut self, key: LayerKey, howfar: usize) -> Result<(), CanvasError> {
        let index = self.key_index(key)?;
        self.raise_layer(index, howfar)
    }

    pub fn lower_layer_by(&mut self, key: LayerKey, howfar: usize) -> Result<(), CanvasError> {
        let index = self.key_index(key)?;
        self.lower_layer(index, howfar)
    }

    pub fn move_layer_to_top(&mut self, key: LayerKey) -> Result<(), CanvasError> {
        let index = self.key_index(key)?;
        self.raise_layer_to_top(index)
    }

    pub fn move_layer_to_bottom(&mut self, key: LayerKey) -> Result<(), CanvasError> {
        let index = self.key_index(key)?;
        self.lower_layer_to_bottom(index)
    }

    /// Puts the given layers at the bottom, in the given order. The other layers keep their order above them.
    ///
    /// Keys that are unknown or repeated are ignored.
    pub fn reorder_layers(&mut self, keys: &[LayerKey]) {
        let mut order: Vec<LayerKey> = Vec::with_capacity(self.layer_order.len());
        for key in keys {
            if self.layer_order.contains(key) && !order.contains(key) {
                order.push(*key);
            }
        }
        for key in self.layer_order.iter() {
            if !order.contains(key) {
                order.push(*key);
            }
        }
        self.layer_order = order;
    }

    /// Deletes all layers and their items.
    pub fn clear(&mut self) {
        for key in std::mem::take(&mut self.layer_order) {
            if let Err(e) = self.delete_layer(key) {
                warn!("Deleting layer while clearing the canvas failed, Err: {e:?}");
            }
        }
    }

    /// Whether the canvas has no layers.
    pub fn empty(&self) -> bool {
        self.layer_order.is_empty()
    }

    /// The number of items on visible layers.
    pub fn n_visible_items(&self) -> usize {
        self.layers()
            .filter(|(_, l)| l.visible())
            .map(|(_, l)| l.size())
            .sum()
    }

    // Items

    /// Adds the item on top of the other items of the layer.
    pub fn add_item(
        &mut self,
        layer_key: LayerKey,
        item: impl Into<CanvasItem>,
    ) -> Result<ItemKey, CanvasError> {
        let layer = self
            .layers
            .get_mut(layer_key)
            .ok_or(CanvasError::InvalidLayerKey)?;
        let key = self.items.insert(item.into());
        layer.insert_item(key, &self.items[key]);
        self.item_layers.insert(key, layer_key);
        Ok(key)
    }

    /// Removes the item from its layer and the canvas.
    pub fn remove_item(&mut self, key: ItemKey) -> Result<CanvasItem, CanvasError> {
        let layer_key = self
            .item_layers
            .get(key)
            .copied()
            .ok_or(CanvasError::ItemNotFound)?;
        if let Some(layer) = self.layers.get_mut(layer_key) {
            layer.remove_item(key);
        }
        self.forget_item(key).ok_or(CanvasError::ItemNotFound)
    }

    /// Removes all items of the layer, the layer itself stays.
    pub fn remove_all_items(&mut self, layer_key: LayerKey) -> Result<(), CanvasError> {
        let layer = self
            .layers
            .get_mut(layer_key)
            .ok_or(CanvasError::InvalidLayerKey)?;
        for key in layer.clear() {
            self.forget_item(key);
        }
        Ok(())
    }

    fn forget_item(&mut self, key: ItemKey) -> Option<CanvasItem> {
        self.item_layers.remove(key);
        self.item_draw_bounds.remove(key);
        self.items.remove(key)
    }

    pub fn item(&self, key: ItemKey) -> Option<&CanvasItem> {
        self.items.get(key)
    }

    /// The layer the item is placed on.
    pub fn item_layer(&self, key: ItemKey) -> Option<LayerKey> {
        self.item_layers.get(key).copied()
    }

    /// The items of the layer in drawing order.
    pub fn layer_items(&self, layer_key: LayerKey) -> Vec<(ItemKey, &CanvasItem)> {
        self.layers
            .get(layer_key)
            .map(|layer| {
                layer
                    .item_keys()
                    .iter()
                    .filter_map(|k| self.items.get(*k).map(|i| (*k, i)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Changes the item. Its layer is marked dirty and the hit-testing index is updated.
    pub fn update_item<R>(
        &mut self,
        key: ItemKey,
        f: impl FnOnce(&mut CanvasItem) -> R,
    ) -> Result<R, CanvasError> {
        let item = self.items.get_mut(key).ok_or(CanvasError::ItemNotFound)?;
        let result = f(item);
        if let Some(layer) = self
            .item_layers
            .get(key)
            .and_then(|lk| self.layers.get_mut(*lk))
        {
            layer.reindex_item(key, item);
        }
        Ok(result)
    }

    /// Makes the item also stroke its bounds, a aid for debugging bounds computations.
    ///
    /// The width is in pixels. None stops drawing the bounds.
    pub fn set_draw_bounds(
        &mut self,
        key: ItemKey,
        bounds_style: Option<(Color, f64)>,
    ) -> Result<(), CanvasError> {
        if !self.items.contains_key(key) {
            return Err(CanvasError::ItemNotFound);
        }
        match bounds_style {
            Some(style) => {
                self.item_draw_bounds.insert(key, style);
            }
            None => {
                self.item_draw_bounds.remove(key);
            }
        }
        if let Some(layer) = self
            .item_layers
            .get(key)
            .and_then(|lk| self.layers.get_mut(*lk))
        {
            layer.mark_dirty();
        }
        Ok(())
    }

    pub(crate) fn draw_bounds_style(&self, key: ItemKey) -> Option<(Color, f64)> {
        self.item_draw_bounds.get(key).copied()
    }

    pub(crate) fn items_map(&self) -> &HopSlotMap<ItemKey, CanvasItem> {
        &self.items
    }

    /// All item keys, layer by layer in drawing order.
    pub fn all_items(&self) -> Vec<ItemKey> {
        self.layers()
            .flat_map(|(_, l)| l.item_keys().iter().copied())
            .collect()
    }

    /// The items on clickable layers that are hit by the point in user coordinates.
    ///
    /// Layers are searched bottom to top, the items of a layer are returned in the order they were added.
    pub fn clicked_items(&self, pt: Coord) -> Vec<ItemKey> {
        let ppu = self.camera.ppu();
        self.layers()
            .filter(|(_, l)| l.clickable())
            .flat_map(|(_, l)| l.clicked_items(&self.items, pt, ppu))
            .collect()
    }

    // Geometry

    /// The bounds of the drawing at the given ppu.
    pub fn bounds(&self, ppu: f64) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for (_, layer) in self.layers().filter(|(_, l)| !l.empty()) {
            bounds.swallow(layer.bounds(&self.items, ppu));
        }
        bounds
    }

    /// The bounds of a single layer at the given ppu.
    pub fn layer_bounds(&self, key: LayerKey, ppu: f64) -> Option<Aabb> {
        self.layers.get(key)?.bounds(&self.items, ppu)
    }

    pub fn ppu(&self) -> f64 {
        self.camera.ppu()
    }

    /// Sets the pixels per unit and recomputes the transform for the current bounds.
    pub fn set_ppu(&mut self, ppu: f64) -> Result<(), CanvasError> {
        Camera::validate_ppu(ppu)?;
        let bounds = self.bounds(ppu);
        self.camera.update(ppu, bounds, self.config.margin);
        self.config.ppu = ppu;
        for layer in self.layers.values_mut() {
            layer.mark_dirty();
        }
        Ok(())
    }

    /// Recomputes the transform after items changed.
    pub fn update_transform(&mut self) -> Result<(), CanvasError> {
        self.set_ppu(self.camera.ppu())
    }

    /// The transform from user coordinates to pixels, as computed by the last [Self::set_ppu].
    pub fn transform(&self) -> kurbo::Affine {
        self.camera.transform()
    }

    /// The pixel size of a bitmap holding the whole drawing with its margin.
    pub fn bitmap_size(&self) -> Coord {
        self.camera.bitmap_size()
    }

    pub fn user_to_pixel(&self, pt: Coord) -> Coord {
        self.camera.user_to_pixel(pt)
    }

    pub fn pixel_to_user(&self, pt: Coord) -> Coord {
        self.camera.pixel_to_user(pt)
    }

    pub fn user_to_pixel_dist(&self, d: f64) -> f64 {
        self.camera.user_to_pixel_dist(d)
    }

    pub fn pixel_to_user_dist(&self, d: f64) -> f64 {
        self.camera.pixel_to_user_dist(d)
    }

    /// The largest ppu at which the visible items fit into `xsize` x `ysize` pixels.
    ///
    /// Is 1.0 when nothing is visible, and infinite when the size of the drawing doesn't depend on the ppu.
    pub fn filled_ppu(&self, xsize: f64, ysize: f64) -> f64 {
        if self.n_visible_items() == 0 {
            return 1.0;
        }
        let items = self
            .layers()
            .filter(|(_, l)| l.visible())
            .flat_map(|(_, l)| l.item_keys().iter())
            .filter_map(|k| self.items.get(*k));
        fill::filled_ppu(items, xsize, ysize)
    }

    // Settings

    pub fn background_color(&self) -> Color {
        self.config.background_color
    }

    /// The background is always opaque, the alpha of the color is ignored.
    pub fn set_background_color(&mut self, color: Color) {
        self.config.background_color = color.opaque();
        self.mark_all_dirty();
    }

    pub fn margin(&self) -> f64 {
        self.config.margin
    }

    /// Blank space around the drawing, as a fraction of its size. Takes effect with the next [Self::set_ppu].
    pub fn set_margin(&mut self, margin: f64) {
        self.config.margin = margin.max(0.0);
    }

    pub fn antialias(&self) -> bool {
        self.config.antialias
    }

    pub fn set_antialias(&mut self, antialias: bool) {
        self.config.antialias = antialias;
        self.mark_all_dirty();
    }

    fn mark_all_dirty(&mut self) {
        for layer in self.layers.values_mut() {
            layer.mark_dirty();
        }
    }

    /// Whether anything changed since the last [Self::mark_clean].
    pub fn is_dirty(&self) -> bool {
        self.layers.values().any(|l| l.dirty())
    }

    pub fn mark_clean(&mut self) {
        for layer in self.layers.values_mut() {
            layer.mark_clean();
        }
    }

    /// Writes the layers and the descriptions of their items.
    pub fn datadump(&self, w: &mut impl Write) -> std::io::Result<()> {
        writeln!(w, "Canvas with {} layers, ppu {}", self.n_layers(), self.ppu())?;
        for (i, (_, layer)) in self.layers().enumerate() {
            writeln!(
                w,
                "Layer {i} \"{}\": {} items, visible: {}, clickable: {}, opacity: {}",
                layer.name(),
                layer.size(),
                layer.visible(),
                layer.clickable(),
                layer.opacity()
            )?;
            for item in layer.item_keys().iter().filter_map(|k| self.items.get(*k)) {
                writeln!(w, "    {item}")?;
            }
        }
        Ok(())
    }
}
