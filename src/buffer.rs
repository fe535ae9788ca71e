use image::{GrayImage, RgbImage};

use crate::error::Error;

/// Row-major, channel-interleaved `f32` image.
///
/// One channel for grayscale/importance/angle maps, three for RGB. Values
/// are unbounded during processing; [`ImageBuf::to_rgb8`] clamps to `[0, 1]`
/// on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuf {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl ImageBuf {
    /// All-zero image.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self::new_fill(width, height, channels, 0.0)
    }

    pub fn new_fill(width: usize, height: usize, channels: usize, value: f32) -> Self {
        let len = width * height * channels;
        Self {
            width,
            height,
            channels,
            data: vec![value; len],
        }
    }

    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize, c: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height && c < self.channels);
        self.data[(y * self.width + x) * self.channels + c]
    }

    #[inline]
    pub fn at_mut(&mut self, x: usize, y: usize, c: usize) -> &mut f32 {
        debug_assert!(x < self.width && y < self.height && c < self.channels);
        &mut self.data[(y * self.width + x) * self.channels + c]
    }

    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || c >= self.channels {
            return None;
        }
        Some(self.data[(y * self.width + x) * self.channels + c])
    }

    /// Sample with coordinates clamped to the image bounds. Used by filter
    /// taps that run past the border.
    #[inline]
    pub fn at_clamped(&self, x: isize, y: isize, c: usize) -> f32 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.at(x, y, c)
    }

    pub fn same_size(&self, other: &ImageBuf) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Decode an RGB image into `[0, 1]` floats.
    pub fn from_rgb8(img: &RgbImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let data = img.pixels().flat_map(|p| p.0).map(|v| v as f32 / 255.0).collect();
        Self {
            width,
            height,
            channels: 3,
            data,
        }
    }

    /// Decode a grayscale image into a single-channel `[0, 1]` stencil.
    pub fn from_luma8(img: &GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let data = img.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Self {
            width,
            height,
            channels: 1,
            data,
        }
    }

    /// Encode to 8-bit RGB, clamping each value to `[0, 1]`. This is the
    /// only place the pipeline clamps.
    pub fn to_rgb8(&self) -> Result<RgbImage, Error> {
        if self.channels != 3 {
            return Err(Error::ChannelMismatch {
                expected: 3,
                actual: self.channels,
            });
        }
        let mut out = RgbImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let px = image::Rgb([
                    (self.at(x, y, 0).clamp(0.0, 1.0) * 255.0).round() as u8,
                    (self.at(x, y, 1).clamp(0.0, 1.0) * 255.0).round() as u8,
                    (self.at(x, y, 2).clamp(0.0, 1.0) * 255.0).round() as u8,
                ]);
                out.put_pixel(x as u32, y as u32, px);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_validates_length() {
        assert!(ImageBuf::from_vec(2, 2, 1, vec![0.0; 4]).is_ok());
        assert_eq!(
            ImageBuf::from_vec(2, 2, 3, vec![0.0; 4]),
            Err(Error::SizeMismatch {
                expected: 12,
                actual: 4
            })
        );
    }

    #[test]
    fn interleaved_indexing() {
        let mut im = ImageBuf::new(3, 2, 3);
        *im.at_mut(2, 1, 1) = 0.5;
        assert_eq!(im.at(2, 1, 1), 0.5);
        assert_eq!(im.at(2, 1, 0), 0.0);
        assert_eq!(im.data()[(1 * 3 + 2) * 3 + 1], 0.5);
        assert_eq!(im.get(3, 1, 0), None);
        assert_eq!(im.get(2, 2, 0), None);
    }

    #[test]
    fn clamped_sampling_extends_edges() {
        let im = ImageBuf::from_vec(2, 1, 1, vec![0.25, 0.75]).unwrap();
        assert_eq!(im.at_clamped(-5, 0, 0), 0.25);
        assert_eq!(im.at_clamped(7, 3, 0), 0.75);
    }

    #[test]
    fn rgb8_round_trip_clamps() {
        let im = ImageBuf::from_vec(1, 1, 3, vec![-0.5, 0.5, 1.5]).unwrap();
        let rgb = im.to_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 128, 255]);

        let gray = ImageBuf::new_fill(2, 2, 1, 1.0);
        assert!(gray.to_rgb8().is_err());
    }
}
