/// Five keypoints as produced by the detector, in frame coordinates:
/// left eye, right eye, nose, left mouth corner, right mouth corner.
///
/// Points with x <= 0 are treated as invisible.
pub type Keypoints = [(f64, f64); 5];

/// A detected face bounding box, clamped to the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
    pub keypoints: Option<Keypoints>,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: 1.0,
            keypoints: None,
        }
    }

    /// Builds a region from corner coordinates, clamped to `frame_w × frame_h`.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_w: u32,
        frame_h: u32,
    ) -> Option<Self> {
        let x1 = x1.max(0.0).round() as i32;
        let y1 = y1.max(0.0).round() as i32;
        let x2 = (x2.min(frame_w as f64)).round() as i32;
        let y2 = (y2.min(frame_h as f64)).round() as i32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.area() as f64;
        let area_b = other.area() as f64;
        inter / (area_a + area_b - inter)
    }
}
