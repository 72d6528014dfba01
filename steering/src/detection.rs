//! Per-frame object detections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A detection value outside the normalized `[0, 1]` range, or not a number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} {value} is not in [0, 1]")]
pub struct InvalidDetection {
    pub field: &'static str,
    pub value: f64,
}

/// Bounding box in normalized frame coordinates.
///
/// All four values are fractions of the frame size, with the origin at the
/// top-left corner. `x` and `y` locate the box center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Center x as a fraction of frame width
    pub x: f64,
    /// Center y as a fraction of frame height
    pub y: f64,
    /// Width as a fraction of frame width
    pub width: f64,
    /// Height as a fraction of frame height
    pub height: f64,
}

impl BoundingBox {
    /// Create a bounding box from normalized center and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center, the value the steering law acts on.
    pub fn mid_x(&self) -> f64 {
        self.x
    }

    /// True if the horizontal center is a finite position inside the frame.
    pub fn has_steerable_center(&self) -> bool {
        (0.0..=1.0).contains(&self.x)
    }
}

/// One object found in a frame by the external detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detector class identifier
    pub class_id: u32,
    /// Detector confidence in `[0, 1]`
    pub confidence: f32,
    /// Normalized box geometry
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }

    /// Detection centered at `mid_x` with an otherwise nominal box.
    ///
    /// Handy for replaying recorded target positions where only the
    /// horizontal center is known.
    pub fn at_mid_x(class_id: u32, mid_x: f64) -> Self {
        Self::new(class_id, 1.0, BoundingBox::new(mid_x, 0.5, 0.1, 0.1))
    }

    /// Check that every box value and the confidence lie in `[0, 1]`.
    ///
    /// NaN and infinities fail the range check.
    pub fn validate(&self) -> Result<(), InvalidDetection> {
        let fields = [
            ("x", self.bbox.x),
            ("y", self.bbox.y),
            ("width", self.bbox.width),
            ("height", self.bbox.height),
            ("confidence", f64::from(self.confidence)),
        ];
        for (field, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidDetection { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_accepts_frame_edges() {
        let det = Detection::new(0, 0.0, BoundingBox::new(0.0, 1.0, 1.0, 0.0));
        assert!(det.validate().is_ok());
        assert!(Detection::at_mid_x(0, 0.5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let det = Detection::new(0, 0.5, BoundingBox::new(7.5, -3.0, 0.1, 0.1));
        assert_eq!(
            det.validate(),
            Err(InvalidDetection {
                field: "x",
                value: 7.5
            })
        );

        let det = Detection::new(0, 42.0, BoundingBox::new(0.5, 0.5, 0.1, 0.1));
        assert_eq!(det.validate().unwrap_err().field, "confidence");

        let det = Detection::new(0, 1.0, BoundingBox::new(0.5, 0.5, 0.1, 1.5));
        assert_eq!(det.validate().unwrap_err().field, "height");
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let det = Detection::at_mid_x(0, value);
            assert!(det.validate().is_err(), "x = {value}");
            assert!(!det.bbox.has_steerable_center());
        }
        let det = Detection::new(0, f32::NAN, BoundingBox::new(0.5, 0.5, 0.1, 0.1));
        assert!(det.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"class_id":0,"confidence":0.9,"bbox":{"x":0.5,"y":0.4,"width":0.1,"height":0.2}}"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.class_id, 0);
        assert_relative_eq!(det.bbox.mid_x(), 0.5);
    }
}
