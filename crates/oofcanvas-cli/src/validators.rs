use std::path::Path;

pub(crate) fn path_is_file(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "Expected file, found directory or nothing at \"{}\"",
            path.display()
        ));
    }
    Ok(())
}

/// Four coordinates `x0 y0 x1 y1` of two opposite corners.
pub(crate) fn region_corners(region: &[f64]) -> anyhow::Result<(na::Vector2<f64>, na::Vector2<f64>)> {
    match region {
        [x0, y0, x1, y1] => Ok((na::vector![*x0, *y0], na::vector![*x1, *y1])),
        _ => Err(anyhow::anyhow!(
            "Expected four coordinates for the region, got {}",
            region.len()
        )),
    }
}
