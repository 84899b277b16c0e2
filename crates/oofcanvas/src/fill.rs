//! Finding the largest ppu at which a drawing fits into a given number of pixels.
//!
//! Items that are partially sized in pixels make the drawn size a piecewise linear function of the ppu.
//! Its pieces change where the item that determines the low or high edge of the drawing changes.

// Imports
use crate::items::ItemBehaviour;
use crate::CanvasItem;
use itertools::Itertools;

/// The extent of a item along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisExtent {
    /// Low edge of the bare bounds, in user units
    pub lo: f64,
    /// High edge of the bare bounds, in user units
    pub hi: f64,
    /// How far the item reaches below `lo`, in pixels
    pub pix_lo: f64,
    /// How far the item reaches above `hi`, in pixels
    pub pix_hi: f64,
}

impl AxisExtent {
    /// The horizontal extent of the item, None if it has no bounds.
    pub fn horizontal(item: &CanvasItem) -> Option<Self> {
        let bounds = item.bare_bounds()?;
        let ext = item.pixel_extents();
        Some(Self {
            lo: bounds.mins[0],
            hi: bounds.maxs[0],
            pix_lo: ext.left,
            pix_hi: ext.right,
        })
    }

    /// The vertical extent of the item, None if it has no bounds.
    pub fn vertical(item: &CanvasItem) -> Option<Self> {
        let bounds = item.bare_bounds()?;
        let ext = item.pixel_extents();
        Some(Self {
            lo: bounds.mins[1],
            hi: bounds.maxs[1],
            pix_lo: ext.down,
            pix_hi: ext.up,
        })
    }
}

/// The size in pixels that the extents take up at the given ppu.
pub fn pixel_size(extents: &[AxisExtent], ppu: f64) -> f64 {
    let hi = extents
        .iter()
        .map(|e| ppu * e.hi + e.pix_hi)
        .fold(f64::NEG_INFINITY, f64::max);
    let lo = extents
        .iter()
        .map(|e| ppu * e.lo - e.pix_lo)
        .fold(f64::INFINITY, f64::min);
    hi - lo
}

/// The ppus at which the item defining the low or high edge changes, sorted and starting at zero.
fn critical_ppus(extents: &[AxisExtent]) -> Vec<f64> {
    let mut critical = vec![0.0];
    for (a, b) in extents.iter().tuple_combinations() {
        if a.lo != b.lo {
            let ppu = (a.pix_lo - b.pix_lo) / (a.lo - b.lo);
            if ppu > 0.0 {
                critical.push(ppu);
            }
        }
        if a.hi != b.hi {
            let ppu = (b.pix_hi - a.pix_hi) / (a.hi - b.hi);
            if ppu > 0.0 {
                critical.push(ppu);
            }
        }
    }
    critical.sort_by(f64::total_cmp);
    critical.dedup();
    critical
}

/// The largest ppu at which the extents take up exactly `size` pixels.
///
/// Returns infinity when the size is never exceeded, because nothing in the extents grows with the ppu,
/// and None when even a vanishing ppu doesn't fit.
pub fn optimal_ppu(size: f64, extents: &[AxisExtent]) -> Option<f64> {
    if extents.is_empty() {
        return Some(f64::INFINITY);
    }
    let critical = critical_ppus(extents);
    let mut best: Option<f64> = None;

    for (&a, &b) in critical.iter().tuple_windows() {
        let wa = pixel_size(extents, a);
        let wb = pixel_size(extents, b);
        if (wa - size) * (wb - size) <= 0.0 {
            let ppu = if wa == wb {
                b
            } else {
                a + (size - wa) * (b - a) / (wb - wa)
            };
            best = Some(best.map_or(ppu, |best| best.max(ppu)));
        }
    }

    // past the last critical ppu the edges are defined by the same items
    let last = critical.last().copied().unwrap_or(0.0);
    let i_max = extents
        .iter()
        .max_by(|a, b| a.hi.total_cmp(&b.hi).then(a.pix_hi.total_cmp(&b.pix_hi)))?;
    let i_min = extents
        .iter()
        .min_by(|a, b| a.lo.total_cmp(&b.lo).then(b.pix_lo.total_cmp(&a.pix_lo)))?;
    let slope = i_max.hi - i_min.lo;
    if slope > 0.0 {
        let ppu = (size - i_max.pix_hi - i_min.pix_lo) / slope;
        if ppu > last && best.map_or(true, |best| ppu > best) {
            best = Some(ppu);
        }
    } else if i_max.pix_hi + i_min.pix_lo <= size {
        best = Some(f64::INFINITY);
    }
    best
}

/// The largest ppu at which the items fit into the given pixel size in both directions.
///
/// A direction that never constrains the ppu yields infinity.
pub fn filled_ppu<'a>(items: impl IntoIterator<Item = &'a CanvasItem>, xsize: f64, ysize: f64) -> f64 {
    let (horizontal, vertical): (Vec<AxisExtent>, Vec<AxisExtent>) = items
        .into_iter()
        .filter_map(|item| Some((AxisExtent::horizontal(item)?, AxisExtent::vertical(item)?)))
        .unzip();
    let ppu_x = optimal_ppu(xsize, &horizontal).unwrap_or(f64::INFINITY);
    let ppu_y = optimal_ppu(ysize, &vertical).unwrap_or(f64::INFINITY);
    ppu_x.min(ppu_y)
}
