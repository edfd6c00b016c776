//! 5-point face landmarks used to align faces before description.
//!
//! Point order: left eye, right eye, nose, left mouth corner, right mouth
//! corner. Weights emphasize nose (3x) over eyes (2x) and mouth (1x) for a
//! stable centroid.

use crate::shared::region::{Keypoints, Region};

const LEFT_EYE: usize = 0;
const RIGHT_EYE: usize = 1;

const WEIGHTS: [f64; 5] = [2.0, 2.0, 3.0, 1.0, 1.0];

/// Average landmark positions as fractions of the face box, used when the
/// detector provides no usable keypoints.
const CANONICAL: [(f64, f64); 5] = [
    (0.30, 0.40),
    (0.70, 0.40),
    (0.50, 0.60),
    (0.35, 0.80),
    (0.65, 0.80),
];

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    /// Points with x <= 0 are treated as invisible.
    points: Keypoints,
}

impl FaceLandmarks {
    pub fn new(points: Keypoints) -> Self {
        Self { points }
    }

    /// Landmarks placed at canonical proportions of `region`.
    pub fn estimate(region: &Region) -> Self {
        let w = region.width as f64;
        let h = region.height as f64;
        let mut points = [(0.0, 0.0); 5];
        for (point, (fx, fy)) in points.iter_mut().zip(CANONICAL.iter()) {
            *point = (region.x as f64 + fx * w, region.y as f64 + fy * h);
        }
        Self { points }
    }

    pub fn points(&self) -> &Keypoints {
        &self.points
    }

    pub fn all_visible(&self) -> bool {
        self.points.iter().all(|(x, _)| *x > 0.0)
    }

    /// Both eyes are visible and apart, so an in-plane rotation can be derived.
    pub fn can_align(&self) -> bool {
        let l = self.points[LEFT_EYE];
        let r = self.points[RIGHT_EYE];
        l.0 > 0.0 && r.0 > 0.0 && self.eye_distance() > 0.0
    }

    /// Weighted centroid of visible landmarks (x > 0).
    pub fn center(&self) -> Result<(f64, f64), &'static str> {
        let mut wx_sum = 0.0;
        let mut wy_sum = 0.0;
        let mut w_sum = 0.0;

        for (i, (x, y)) in self.points.iter().enumerate() {
            if *x > 0.0 {
                let w = WEIGHTS[i];
                wx_sum += x * w;
                wy_sum += y * w;
                w_sum += w;
            }
        }

        if w_sum == 0.0 {
            return Err("No visible landmarks");
        }

        Ok((wx_sum / w_sum, wy_sum / w_sum))
    }

    pub fn eye_midpoint(&self) -> (f64, f64) {
        let l = self.points[LEFT_EYE];
        let r = self.points[RIGHT_EYE];
        ((l.0 + r.0) / 2.0, (l.1 + r.1) / 2.0)
    }

    pub fn eye_distance(&self) -> f64 {
        let l = self.points[LEFT_EYE];
        let r = self.points[RIGHT_EYE];
        ((r.0 - l.0).powi(2) + (r.1 - l.1).powi(2)).sqrt()
    }

    /// In-plane rotation of the eye line, in radians. 0.0 = level eyes.
    pub fn roll(&self) -> f64 {
        let l = self.points[LEFT_EYE];
        let r = self.points[RIGHT_EYE];
        (r.1 - l.1).atan2(r.0 - l.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frontal_landmarks() -> FaceLandmarks {
        FaceLandmarks::new([
            (440.0, 350.0),
            (560.0, 350.0),
            (500.0, 420.0),
            (460.0, 470.0),
            (540.0, 470.0),
        ])
    }

    #[test]
    fn test_estimate_places_points_inside_region() {
        let region = Region::new(100, 50, 200, 100);
        let lm = FaceLandmarks::estimate(&region);
        for (x, y) in lm.points() {
            assert!(*x > 100.0 && *x < 300.0);
            assert!(*y > 50.0 && *y < 150.0);
        }
        assert!(lm.all_visible());
        assert_relative_eq!(lm.roll(), 0.0);
    }

    #[test]
    fn test_center_weights_nose() {
        let (cx, cy) = frontal_landmarks().center().unwrap();
        assert_relative_eq!(cx, 500.0);
        // (350*2 + 350*2 + 420*3 + 470 + 470) / 9
        assert_relative_eq!(cy, 3600.0 / 9.0);
    }

    #[test]
    fn test_center_ignores_invisible_points() {
        let lm = FaceLandmarks::new([
            (0.0, 0.0),
            (0.0, 0.0),
            (100.0, 200.0),
            (0.0, 0.0),
            (0.0, 0.0),
        ]);
        let (cx, cy) = lm.center().unwrap();
        assert_relative_eq!(cx, 100.0);
        assert_relative_eq!(cy, 200.0);
        assert!(!lm.all_visible());
        assert!(!lm.can_align());
    }

    #[test]
    fn test_center_no_visible_points_errors() {
        let lm = FaceLandmarks::new([(0.0, 0.0); 5]);
        assert!(lm.center().is_err());
    }

    #[test]
    fn test_eye_geometry() {
        let lm = frontal_landmarks();
        assert_relative_eq!(lm.eye_distance(), 120.0);
        assert_eq!(lm.eye_midpoint(), (500.0, 350.0));
        assert!(lm.can_align());
    }

    #[test]
    fn test_roll_of_tilted_eyes() {
        let lm = FaceLandmarks::new([
            (100.0, 100.0),
            (200.0, 200.0),
            (150.0, 180.0),
            (120.0, 220.0),
            (180.0, 240.0),
        ]);
        assert_relative_eq!(lm.roll(), std::f64::consts::FRAC_PI_4);
    }
}
