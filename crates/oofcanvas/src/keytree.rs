// Imports
use crate::ItemKey;
use p2d::bounding_volume::Aabb;
use rstar::primitives::GeomWithData;

/// The rtree object that holds the bounds and [ItemKey].
type KeyTreeObject = GeomWithData<rstar::primitives::Rectangle<[f64; 2]>, ItemKey>;

/// A Rtree with [ItemKey]'s as associated data.
///
/// Holds the bare bounds of the items of a layer, for faster hit-testing.
#[derive(Debug, Default)]
pub(crate) struct KeyTree(rstar::RTree<KeyTreeObject, rstar::DefaultParams>);

impl KeyTree {
    /// Insert a new tree object with the given [ItemKey] and bounds.
    pub(crate) fn insert_with_key(&mut self, key: ItemKey, bounds: Aabb) {
        self.0.insert(new_keytree_object(key, bounds));
    }

    /// Removes the [KeyTreeObject] for the given key.
    pub(crate) fn remove_with_key(&mut self, key: ItemKey) -> Option<(ItemKey, Aabb)> {
        let object_to_remove = self.0.iter().find(|&object| object.data == key)?.to_owned();

        self.0.remove(&object_to_remove).map(keytree_to_pair)
    }

    /// Update the tree with new bounds for the given key.
    ///
    /// Has to be called when the geometry of the item has changed.
    pub(crate) fn update_with_key(&mut self, key: ItemKey, new_bounds: Option<Aabb>) {
        self.remove_with_key(key);
        if let Some(bounds) = new_bounds {
            self.insert_with_key(key, bounds);
        }
    }

    /// Return the keys that intersect with the given bounds.
    pub(crate) fn keys_intersecting_bounds(&self, bounds: Aabb) -> Vec<ItemKey> {
        self.0
            .locate_in_envelope_intersecting(&rstar::AABB::from_corners(
                [bounds.mins[0], bounds.mins[1]],
                [bounds.maxs[0], bounds.maxs[1]],
            ))
            .map(|object| object.data)
            .collect()
    }

    ///  Clear the entire tree.
    pub(crate) fn clear(&mut self) {
        *self = Self::default()
    }
}

fn new_keytree_object(key: ItemKey, bounds: Aabb) -> KeyTreeObject {
    KeyTreeObject::new(
        rstar::primitives::Rectangle::from_corners(
            [bounds.mins[0], bounds.mins[1]],
            [bounds.maxs[0], bounds.maxs[1]],
        ),
        key,
    )
}

fn keytree_to_pair(key_object: KeyTreeObject) -> (ItemKey, Aabb) {
    (
        key_object.data,
        Aabb::new(
            na::point![key_object.geom().lower()[0], key_object.geom().lower()[1]],
            na::point![key_object.geom().upper()[0], key_object.geom().upper()[1]],
        ),
    )
}
