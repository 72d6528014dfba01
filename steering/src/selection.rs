//! Choosing the governing detection in a frame.
//!
//! The controller steers toward a single detection per frame. Detections carry
//! no identity across frames, so the choice is made fresh every frame.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::detection::Detection;

/// Rule for picking one detection out of a frame's detections.
///
/// `LastListed` is the historical behavior: every detection is visited in
/// order and the final one governs. The other two rules are available for
/// deployments that want them but are not the default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum SelectionPolicy {
    /// Last detection in the given order
    #[default]
    #[strum(serialize = "last")]
    #[serde(rename = "last")]
    LastListed,
    /// First detection in the given order
    #[strum(serialize = "first")]
    #[serde(rename = "first")]
    FirstListed,
    /// Highest confidence; the later detection wins a tie
    #[strum(serialize = "confidence")]
    #[serde(rename = "confidence")]
    HighestConfidence,
}

impl SelectionPolicy {
    /// Select the governing detection.
    ///
    /// Detections whose center is NaN or outside the frame are never
    /// chosen. When `classes` is given, detections of any other class are
    /// ignored too. Returns `None` if nothing is left to choose from.
    pub fn select<'a>(
        &self,
        detections: &'a [Detection],
        classes: Option<&[u32]>,
    ) -> Option<&'a Detection> {
        let mut candidates = detections
            .iter()
            .filter(|d| d.bbox.has_steerable_center())
            .filter(move |d| classes.map_or(true, |c| c.contains(&d.class_id)));

        match self {
            Self::LastListed => candidates.last(),
            Self::FirstListed => candidates.next(),
            Self::HighestConfidence => {
                candidates.max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            }
        }
    }
}
