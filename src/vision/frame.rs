//! Camera frames and hand regions.

/// Bytes per RGB8 pixel.
const CHANNELS: usize = 3;

/// An RGB8 image, row-major, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGB8 pixels.
    ///
    /// # Returns
    /// `None` if `pixels` does not hold exactly `width * height` RGB triples.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?.checked_mul(CHANNELS)?;
        (pixels.len() == expected).then_some(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGB triple at (`x`, `y`), or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.pixels[offset], self.pixels[offset + 1], self.pixels[offset + 2]])
    }

    /// Flip horizontally, as a selfie camera preview does.
    pub fn mirrored(&self) -> Frame {
        let row_len = self.width as usize * CHANNELS;
        let mut pixels = Vec::with_capacity(self.pixels.len());

        for row in self.pixels.chunks_exact(row_len.max(1)).take(self.height as usize) {
            for pixel in row.chunks_exact(CHANNELS).rev() {
                pixels.extend_from_slice(pixel);
            }
        }

        Frame { width: self.width, height: self.height, pixels }
    }

    /// Copy out the region under `roi`, clipped to the frame.
    pub fn crop(&self, roi: &BoundingBox) -> Frame {
        let x0 = roi.x.min(self.width);
        let y0 = roi.y.min(self.height);
        let x1 = roi.x.saturating_add(roi.width).min(self.width);
        let y1 = roi.y.saturating_add(roi.height).min(self.height);

        let width = x1 - x0;
        let height = y1 - y0;
        let row_len = self.width as usize * CHANNELS;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);

        for y in y0..y1 {
            let start = y as usize * row_len + x0 as usize * CHANNELS;
            let end = start + width as usize * CHANNELS;
            pixels.extend_from_slice(&self.pixels[start..end]);
        }

        Frame { width, height, pixels }
    }
}

/// A hand landmark in normalized image coordinates (0.0 - 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Tightest box around a hand's landmarks.
    ///
    /// Landmarks are scaled to pixels (truncating), clamped to the frame and
    /// spanned by their min/max coordinates.
    ///
    /// # Arguments
    /// * `landmarks` - Normalized landmark positions
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    ///
    /// # Returns
    /// `None` when there are no landmarks or the box has zero area.
    pub fn from_landmarks(landmarks: &[Landmark], width: u32, height: u32) -> Option<Self> {
        let to_px = |v: f32, extent: u32| -> u32 {
            if v.is_nan() {
                return 0;
            }
            ((v * extent as f32) as i64).clamp(0, extent as i64) as u32
        };

        let xs = landmarks.iter().map(|l| to_px(l.x, width));
        let ys = landmarks.iter().map(|l| to_px(l.y, height));

        let (min_x, max_x) = xs.fold(None, min_max)?;
        let (min_y, max_y) = ys.fold(None, min_max)?;

        let bbox = BoundingBox { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y };
        (bbox.width > 0 && bbox.height > 0).then_some(bbox)
    }
}

fn min_max(acc: Option<(u32, u32)>, v: u32) -> Option<(u32, u32)> {
    Some(match acc {
        Some((lo, hi)) => (lo.min(v), hi.max(v)),
        None => (v, v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x2 frame where every pixel encodes its own coordinates.
    fn gradient() -> Frame {
        let mut pixels = Vec::new();
        for y in 0..2u8 {
            for x in 0..4u8 {
                pixels.extend_from_slice(&[x, y, 7]);
            }
        }
        Frame::from_rgb(4, 2, pixels).unwrap()
    }

    #[test]
    fn test_from_rgb_rejects_wrong_length() {
        assert!(Frame::from_rgb(2, 2, vec![0; 11]).is_none());
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_some());
    }

    #[test]
    fn test_mirrored_flips_rows() {
        let frame = gradient().mirrored();
        assert_eq!(frame.pixel(0, 0), Some([3, 0, 7]));
        assert_eq!(frame.pixel(3, 1), Some([0, 1, 7]));
        assert_eq!(frame.mirrored(), gradient());
    }

    #[test]
    fn test_crop_clips_to_frame() {
        let frame = gradient();
        let roi = frame.crop(&BoundingBox { x: 2, y: 1, width: 10, height: 10 });
        assert_eq!((roi.width(), roi.height()), (2, 1));
        assert_eq!(roi.pixel(0, 0), Some([2, 1, 7]));
        assert_eq!(roi.pixel(1, 0), Some([3, 1, 7]));

        let outside = frame.crop(&BoundingBox { x: 9, y: 9, width: 2, height: 2 });
        assert!(outside.is_empty());
    }

    #[test]
    fn test_bbox_from_landmarks() {
        let landmarks = [Landmark { x: 0.25, y: 0.5 }, Landmark { x: 0.75, y: 0.125 }, Landmark { x: 0.5, y: 0.75 }];
        let bbox = BoundingBox::from_landmarks(&landmarks, 640, 480).unwrap();
        assert_eq!(bbox, BoundingBox { x: 160, y: 60, width: 320, height: 300 });
    }

    #[test]
    fn test_bbox_from_landmarks_clamps_out_of_frame_points() {
        let landmarks = [Landmark { x: -0.25, y: 0.25 }, Landmark { x: 1.5, y: 0.5 }];
        let bbox = BoundingBox::from_landmarks(&landmarks, 100, 100).unwrap();
        assert_eq!(bbox, BoundingBox { x: 0, y: 25, width: 100, height: 25 });
    }

    #[test]
    fn test_bbox_from_landmarks_degenerate() {
        assert!(BoundingBox::from_landmarks(&[], 100, 100).is_none());

        let single = [Landmark { x: 0.5, y: 0.5 }];
        assert!(BoundingBox::from_landmarks(&single, 100, 100).is_none());
    }
}
