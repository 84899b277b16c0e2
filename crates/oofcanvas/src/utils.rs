/// (De)Serialize a [image::RgbaImage] as its size and base64 encoded rgba8 data.
pub mod rgba_image_base64 {
    use base64::Engine;
    use serde::{Deserialize, Serialize};
    use serde::{Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename = "rgba_image")]
    struct EncodedImage {
        #[serde(rename = "width")]
        width: u32,
        #[serde(rename = "height")]
        height: u32,
        #[serde(rename = "data")]
        data: String,
    }

    /// Serialize a [image::RgbaImage]
    pub fn serialize<S: Serializer>(v: &image::RgbaImage, s: S) -> Result<S::Ok, S::Error> {
        EncodedImage {
            width: v.width(),
            height: v.height(),
            data: base64::engine::general_purpose::STANDARD.encode(v.as_raw()),
        }
        .serialize(s)
    }

    /// Deserialize a [image::RgbaImage], failing when the data doesn't match the size
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<image::RgbaImage, D::Error> {
        let encoded = EncodedImage::deserialize(d)?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.data.as_bytes())
            .map_err(serde::de::Error::custom)?;
        image::RgbaImage::from_raw(encoded.width, encoded.height, data).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "rgba data does not match the image size {}x{}",
                encoded.width, encoded.height
            ))
        })
    }
}

/// Converts a image surface of cairo's native premultiplied ARGB32 format into a straight rgba8 image.
pub fn image_surface_to_rgba(
    surface: &mut cairo::ImageSurface,
) -> Result<image::RgbaImage, crate::CanvasError> {
    let width = surface.width().max(0) as u32;
    let height = surface.height().max(0) as u32;
    let stride = surface.stride().max(0) as usize;
    surface.flush();
    let data = surface
        .data()
        .map_err(|e| anyhow::anyhow!("Accessing image surface data failed, Err: {e:?}"))?;

    let mut rgba = image::RgbaImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels_mut() {
        let i = y as usize * stride + 4 * x as usize;
        // ARGB32 is stored as a native endian u32
        let argb = u32::from_ne_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let a = (argb >> 24) & 0xff;
        let unpremultiply = |c: u32| -> u8 {
            if a == 0 {
                0
            } else {
                ((c * 255 + a / 2) / a).min(255) as u8
            }
        };
        *pixel = image::Rgba([
            unpremultiply((argb >> 16) & 0xff),
            unpremultiply((argb >> 8) & 0xff),
            unpremultiply(argb & 0xff),
            a as u8,
        ]);
    }
    Ok(rgba)
}
