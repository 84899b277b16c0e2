//! Scenes are the json file format of a canvas: its configuration and the layers with their items.

// Imports
use crate::items::CanvasImage;
use crate::{Canvas, CanvasConfig, CanvasError, CanvasItem};
use oofcanvas_compose::{Color, Coord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A item in a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "scene_item")]
pub enum SceneItem {
    /// Any item, stored as is. Images carry their raster.
    #[serde(rename = "item")]
    Item(CanvasItem),
    /// An image loaded from a file when the scene is turned into a canvas.
    #[serde(rename = "image_file")]
    ImageFile {
        /// Relative paths are resolved against the directory of the scene
        #[serde(rename = "path")]
        path: PathBuf,
        #[serde(flatten)]
        placement: ImagePlacement,
    },
    /// An image with a raster of a single color.
    #[serde(rename = "blank_image")]
    BlankImage {
        #[serde(rename = "pixel_width")]
        pixel_width: u32,
        #[serde(rename = "pixel_height")]
        pixel_height: u32,
        #[serde(rename = "color")]
        color: Color,
        #[serde(flatten)]
        placement: ImagePlacement,
    },
}

impl From<CanvasItem> for SceneItem {
    fn from(value: CanvasItem) -> Self {
        Self::Item(value)
    }
}

/// Where and how large an image loaded with a scene is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "image_placement")]
pub struct ImagePlacement {
    /// The lower left corner, in user coordinates
    #[serde(rename = "position")]
    pub position: Coord,
    /// Defaults to the pixel dimensions of the raster. A non-positive component is inferred from the aspect ratio.
    #[serde(rename = "size")]
    pub size: Option<Coord>,
    #[serde(rename = "size_in_pixels")]
    pub size_in_pixels: bool,
    #[serde(rename = "opacity")]
    pub opacity: f64,
    #[serde(rename = "draw_individual_pixels")]
    pub draw_individual_pixels: bool,
}

impl Default for ImagePlacement {
    fn default() -> Self {
        Self {
            position: Coord::zeros(),
            size: None,
            size_in_pixels: false,
            opacity: 1.0,
            draw_individual_pixels: false,
        }
    }
}

impl ImagePlacement {
    fn place(&self, mut image: CanvasImage) -> CanvasImage {
        if let Some(size) = self.size {
            if self.size_in_pixels {
                image.set_size_in_pixels(size[0], size[1]);
            } else {
                image.set_size(size[0], size[1]);
            }
        }
        image.set_opacity(self.opacity);
        image.set_draw_individual_pixels(self.draw_individual_pixels);
        image
    }
}

impl SceneItem {
    /// Turns the scene item into a canvas item, loading image files relative to the base directory.
    pub fn resolve(self, base_dir: Option<&Path>) -> Result<CanvasItem, CanvasError> {
        match self {
            Self::Item(item) => Ok(item),
            Self::ImageFile { path, placement } => {
                let path = match base_dir {
                    Some(base_dir) if path.is_relative() => base_dir.join(path),
                    _ => path,
                };
                debug!("loading scene image from {}", path.display());
                let image = CanvasImage::new_from_file(placement.position, &path)?;
                Ok(placement.place(image).into())
            }
            Self::BlankImage {
                pixel_width,
                pixel_height,
                color,
                placement,
            } => {
                let image =
                    CanvasImage::new_blank(placement.position, pixel_width, pixel_height, color);
                Ok(placement.place(image).into())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "scene_layer")]
pub struct SceneLayer {
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "visible")]
    pub visible: bool,
    #[serde(rename = "clickable")]
    pub clickable: bool,
    #[serde(rename = "opacity")]
    pub opacity: f64,
    /// Bottom to top
    #[serde(rename = "items")]
    pub items: Vec<SceneItem>,
}

impl Default for SceneLayer {
    fn default() -> Self {
        Self {
            name: String::from("layer"),
            visible: true,
            clickable: false,
            opacity: 1.0,
            items: Vec::new(),
        }
    }
}

/// A canvas as stored in a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename = "scene")]
pub struct Scene {
    #[serde(rename = "config")]
    pub config: CanvasConfig,
    /// Bottom to top
    #[serde(rename = "layers")]
    pub layers: Vec<SceneLayer>,
}

impl Scene {
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self, CanvasError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn save_as_bytes(&self) -> Result<Vec<u8>, CanvasError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Builds the canvas with its transform computed for the configured ppu.
    ///
    /// Image files with relative paths are loaded relative to `base_dir`, if given.
    pub fn into_canvas(self, base_dir: Option<&Path>) -> Result<Canvas, CanvasError> {
        let mut canvas = Canvas::from_config(self.config)?;
        for scene_layer in self.layers {
            let key = canvas.new_layer(scene_layer.name);
            for item in scene_layer.items {
                canvas.add_item(key, item.resolve(base_dir)?)?;
            }
            let layer = canvas.layer_mut(key).ok_or(CanvasError::InvalidLayerKey)?;
            if scene_layer.visible {
                layer.show();
            } else {
                layer.hide();
            }
            layer.set_clickable(scene_layer.clickable);
            layer.set_opacity(scene_layer.opacity);
        }
        canvas.update_transform()?;
        Ok(canvas)
    }

    /// Captures the layers and items of the canvas. Images are stored with their raster.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let layers = canvas
            .layers()
            .map(|(key, layer)| SceneLayer {
                name: layer.name().to_string(),
                visible: layer.visible(),
                clickable: layer.clickable(),
                opacity: layer.opacity(),
                items: canvas
                    .layer_items(key)
                    .into_iter()
                    .map(|(_, item)| SceneItem::Item(item.clone()))
                    .collect(),
            })
            .collect();
        Self {
            config: *canvas.config(),
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{CanvasCircle, CanvasRectangle};
    use approx::assert_relative_eq;
    use oofcanvas_compose::ext::AabbExt;

    const SCENE: &str = r#"{
        "config": { "ppu": 2.0, "background_color": { "r": 0.0, "g": 0.0, "b": 0.0, "a": 0.5 } },
        "layers": [
            {
                "name": "shapes",
                "clickable": true,
                "items": [
                    { "item": { "rectangle": { "p0": [0.0, 0.0], "p1": [10.0, 5.0] } } },
                    { "blank_image": {
                        "pixel_width": 4, "pixel_height": 2,
                        "color": { "r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0 },
                        "position": [10.0, 0.0], "size": [2.0, 0.0]
                    } }
                ]
            },
            { "name": "hidden", "visible": false, "opacity": 0.25 }
        ]
    }"#;

    #[test]
    fn load_scene() {
        let scene = Scene::load_from_bytes(SCENE.as_bytes()).unwrap();
        let canvas = scene.into_canvas(None).unwrap();
        assert_eq!(canvas.n_layers(), 2);
        assert_relative_eq!(canvas.ppu(), 2.0);
        assert_eq!(canvas.background_color(), Color::BLACK);

        let shapes = canvas.layer_by_name("shapes").unwrap();
        assert!(canvas.layer(shapes).unwrap().clickable());
        assert_eq!(canvas.layer(shapes).unwrap().size(), 2);
        let hidden = canvas.layer(canvas.layer_by_name("hidden").unwrap()).unwrap();
        assert!(!hidden.visible());
        assert_relative_eq!(hidden.opacity(), 0.25);

        // the image height is inferred from its aspect ratio
        let bounds = canvas.bounds(canvas.ppu()).unwrap();
        assert_relative_eq!(bounds.lower_left(), na::vector![0.0, 0.0]);
        assert_relative_eq!(bounds.upper_right(), na::vector![12.0, 5.0]);
        assert_relative_eq!(canvas.bitmap_size(), na::vector![24.0, 10.0]);
    }

    #[test]
    fn missing_image_file() {
        let item = SceneItem::ImageFile {
            path: PathBuf::from("does-not-exist.png"),
            placement: ImagePlacement::default(),
        };
        assert!(item.resolve(Some(Path::new("/nonexistent"))).is_err());
    }

    #[test]
    fn malformed_scene() {
        assert!(matches!(
            Scene::load_from_bytes(b"{ \"layers\": 3 }"),
            Err(CanvasError::Json(_))
        ));
    }

    #[test]
    fn canvas_round_trip() {
        let mut canvas = Canvas::new(3.0).unwrap();
        let bottom = canvas.new_layer("bottom");
        let top = canvas.new_layer("top");
        canvas
            .add_item(
                bottom,
                CanvasRectangle::new(na::vector![0.0, 0.0], na::vector![1.0, 1.0]),
            )
            .unwrap();
        canvas
            .add_item(top, CanvasCircle::new(na::vector![2.0, 2.0], 1.0))
            .unwrap();
        canvas.layer_mut(top).unwrap().set_opacity(0.5);
        let background = Color::new(0.1, 0.2, 1.0 / 3.0, 1.0);
        canvas.set_background_color(background);

        let bytes = Scene::from_canvas(&canvas).save_as_bytes().unwrap();
        let restored = Scene::load_from_bytes(&bytes)
            .unwrap()
            .into_canvas(None)
            .unwrap();
        assert_eq!(restored.n_layers(), 2);
        assert_relative_eq!(restored.ppu(), 3.0);
        assert_eq!(restored.background_color(), background);
        let top = restored.layer_at(1).unwrap();
        assert_eq!(restored.layer(top).unwrap().name(), "top");
        assert_relative_eq!(restored.layer(top).unwrap().opacity(), 0.5);
        assert!(matches!(
            restored.layer_items(top)[0].1,
            CanvasItem::Circle(_)
        ));
        assert_eq!(
            restored.bounds(3.0).map(|b| b.upper_right()),
            canvas.bounds(3.0).map(|b| b.upper_right())
        );
    }
}
