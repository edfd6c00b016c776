use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Ratio of chip side to eye distance (ArcFace template: 112px chip,
/// ~35px between the eyes).
const SIDE_PER_EYE_DISTANCE: f64 = 3.15;

/// Vertical position of the eye line within the chip, as a fraction of
/// its side.
const EYE_LINE_Y: f64 = 0.46;

/// Extracts a square, upright face chip of `size × size` pixels.
///
/// When both eyes are located the chip is rotated so they are level and
/// scaled from the eye distance; otherwise it falls back to a square crop
/// around the region. Samples outside the source frame are black.
pub fn extract(frame: &Frame, region: &Region, landmarks: &FaceLandmarks, size: u32) -> Frame {
    if landmarks.can_align() {
        aligned_chip(frame, landmarks, size)
    } else {
        square_chip(frame, region, size)
    }
}

fn aligned_chip(frame: &Frame, landmarks: &FaceLandmarks, size: u32) -> Frame {
    let side = landmarks.eye_distance() * SIDE_PER_EYE_DISTANCE;
    let (mx, my) = landmarks.eye_midpoint();
    let angle = landmarks.roll();
    let (sin, cos) = angle.sin_cos();
    let scale = side / size as f64;
    let eye_x = 0.5 * size as f64;
    let eye_y = EYE_LINE_Y * size as f64;

    sample(frame, size, |u, v| {
        let dx = (u - eye_x) * scale;
        let dy = (v - eye_y) * scale;
        (mx + dx * cos - dy * sin, my + dx * sin + dy * cos)
    })
}

fn square_chip(frame: &Frame, region: &Region, size: u32) -> Frame {
    let (cx, cy) = region.center();
    let side = region.width.max(region.height).max(1) as f64;
    let scale = side / size as f64;
    let half = size as f64 / 2.0;

    sample(frame, size, |u, v| {
        (cx + (u - half) * scale, cy + (v - half) * scale)
    })
}

/// Nearest-neighbour resampling; `map` takes chip pixel centers to source
/// coordinates.
fn sample(frame: &Frame, size: u32, map: impl Fn(f64, f64) -> (f64, f64)) -> Frame {
    let channels = frame.channels() as usize;
    let s = size as usize;
    let mut data = vec![0u8; s * s * channels];

    for v in 0..s {
        for u in 0..s {
            let (sx, sy) = map(u as f64 + 0.5, v as f64 + 0.5);
            if let Some(px) = frame.pixel(sx.floor() as i64, sy.floor() as i64) {
                let offset = (v * s + u) * channels;
                data[offset..offset + channels].copy_from_slice(px);
            }
        }
    }

    Frame::new(data, size, size, channels as u8)
}
