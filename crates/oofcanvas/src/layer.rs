// Imports
use crate::items::ItemBehaviour;
use crate::keytree::KeyTree;
use crate::{CanvasItem, ItemKey};
use oofcanvas_compose::ext::{AabbExt, OptionAabbExt};
use oofcanvas_compose::Coord;
use p2d::bounding_volume::Aabb;
use slotmap::HopSlotMap;

/// A named group of items that is drawn, shown and hidden together.
///
/// The items themselves are owned by the [Canvas](crate::Canvas), a layer holds their keys in drawing order
/// and a spatial index over their bare bounds.
#[derive(Debug)]
pub struct Layer {
    name: String,
    items: Vec<ItemKey>,
    key_tree: KeyTree,
    visible: bool,
    clickable: bool,
    opacity: f64,
    /// The largest pixel extent of any item, to widen hit-test queries on the tree.
    max_pixel_extent: f64,
    dirty: bool,
}

impl Layer {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            key_tree: KeyTree::default(),
            visible: true,
            clickable: false,
            opacity: 1.0,
            max_pixel_extent: 0.0,
            dirty: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn clickable(&self) -> bool {
        self.clickable
    }

    /// The alpha the whole layer is composited with.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            self.dirty = true;
        }
    }

    pub fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.dirty = true;
        }
    }

    pub fn set_clickable(&mut self, clickable: bool) {
        self.clickable = clickable;
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.dirty = true;
    }

    /// The number of items.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item keys in drawing order.
    pub fn item_keys(&self) -> &[ItemKey] {
        &self.items
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn insert_item(&mut self, key: ItemKey, item: &CanvasItem) {
        self.items.push(key);
        if let Some(bounds) = item.bare_bounds() {
            self.key_tree.insert_with_key(key, bounds);
        }
        self.max_pixel_extent = self.max_pixel_extent.max(item.pixel_extents().max());
        self.dirty = true;
    }

    /// Returns false if the layer did not contain the item.
    pub(crate) fn remove_item(&mut self, key: ItemKey) -> bool {
        let Some(index) = self.items.iter().position(|k| *k == key) else {
            return false;
        };
        self.items.remove(index);
        self.key_tree.remove_with_key(key);
        self.dirty = true;
        true
    }

    /// Updates the index after the geometry of a item changed.
    pub(crate) fn reindex_item(&mut self, key: ItemKey, item: &CanvasItem) {
        self.key_tree.update_with_key(key, item.bare_bounds());
        self.max_pixel_extent = self.max_pixel_extent.max(item.pixel_extents().max());
        self.dirty = true;
    }

    /// Removes all items, returning their keys.
    pub(crate) fn clear(&mut self) -> Vec<ItemKey> {
        self.key_tree.clear();
        self.max_pixel_extent = 0.0;
        self.dirty = true;
        std::mem::take(&mut self.items)
    }

    /// The union of the bounds of the items at the given ppu.
    pub(crate) fn bounds(&self, items: &HopSlotMap<ItemKey, CanvasItem>, ppu: f64) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for item in self.items.iter().filter_map(|k| items.get(*k)) {
            bounds.swallow(item.bounds(ppu));
        }
        bounds
    }

    /// The keys of the items hit by the point, in the order they were added.
    pub(crate) fn clicked_items(
        &self,
        items: &HopSlotMap<ItemKey, CanvasItem>,
        pt: Coord,
        ppu: f64,
    ) -> Vec<ItemKey> {
        let reach = self.max_pixel_extent / ppu;
        let query = Aabb::from_point(pt).expand(reach, reach, reach, reach);
        let candidates = self.key_tree.keys_intersecting_bounds(query);
        if candidates.is_empty() {
            return vec![];
        }
        self.items
            .iter()
            .copied()
            .filter(|key| candidates.contains(key))
            .filter(|key| {
                items.get(*key).is_some_and(|item| {
                    item.bounds(ppu).contains_pt(pt) && item.contains_point(pt, ppu)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasDot, CanvasRectangle};
    use oofcanvas_compose::Color;

    #[test]
    fn clicked_items_keep_insertion_order() {
        let mut items: HopSlotMap<ItemKey, CanvasItem> = HopSlotMap::with_key();
        let mut layer = Layer::new("shapes");

        let mut rect = CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![10.0, 10.0]);
        rect.style.set_fill_color(Color::RED);
        let mut dot = CanvasDot::new(na::vector![11.0, 5.0], 20.0);
        dot.style.set_fill_color(Color::BLUE);
        let mut small = CanvasRectangle::new(na::vector![4.0, 4.0], na::vector![6.0, 6.0]);
        small.style.set_fill_color(Color::GREEN);

        let k_rect = items.insert(rect.into());
        let k_dot = items.insert(dot.into());
        let k_small = items.insert(small.into());
        for key in [k_rect, k_dot, k_small] {
            layer.insert_item(key, &items[key]);
        }

        assert_eq!(
            layer.clicked_items(&items, na::vector![5.0, 5.0], 1.0),
            vec![k_rect, k_small]
        );
        // the dot reaches 20 pixels, which is 2 units at a ppu of 10
        assert_eq!(
            layer.clicked_items(&items, na::vector![9.5, 5.0], 10.0),
            vec![k_rect, k_dot]
        );
        assert!(layer
            .clicked_items(&items, na::vector![12.5, 5.0], 100.0)
            .is_empty());

        assert!(layer.remove_item(k_rect));
        assert!(!layer.remove_item(k_rect));
        assert_eq!(
            layer.clicked_items(&items, na::vector![5.0, 5.0], 1.0),
            vec![k_small]
        );
        assert_eq!(layer.size(), 2);
    }

    #[test]
    fn bounds_union() {
        let mut items: HopSlotMap<ItemKey, CanvasItem> = HopSlotMap::with_key();
        let mut layer = Layer::new("l");
        assert!(layer.bounds(&items, 1.0).is_none());
        let key = items.insert(CanvasDot::new(na::vector![1.0, 1.0], 5.0).into());
        layer.insert_item(key, &items[key]);
        let key = items.insert(
            CanvasRectangle::new(na::vector![2.0, 2.0], na::vector![4.0, 3.0]).into(),
        );
        layer.insert_item(key, &items[key]);
        let b = layer.bounds(&items, 10.0).unwrap();
        assert_eq!(b.lower_left(), na::vector![0.5, 0.5]);
        assert_eq!(b.upper_right(), na::vector![4.0, 3.0]);
    }
}
