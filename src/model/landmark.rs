use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{SignplayError, SignplayResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A single skeletal keypoint in normalized `[0,1]` image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    /// Horizontal position, `0` is the left edge.
    pub x: f64,
    /// Vertical position, `0` is the top edge.
    pub y: f64,
    /// Relative depth, if the detector produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence, if the detector produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    /// A 2D landmark with no depth or confidence.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// Pixel position on `canvas`.
    pub fn project(&self, canvas: Canvas) -> Point {
        canvas.project(self.x, self.y)
    }
}

/// Ordered landmarks of one joint group. Position in the list is the joint identity.
pub type LandmarkSet = Vec<Landmark>;

/// One instant of pose and both hands.
///
/// An empty set means the group was not detected in that frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameData {
    /// Body pose landmarks.
    #[serde(default, alias = "pose_landmarks")]
    pub pose: LandmarkSet,
    /// Left hand landmarks.
    #[serde(default, alias = "left_hand_landmarks")]
    pub left_hand: LandmarkSet,
    /// Right hand landmarks.
    #[serde(default, alias = "right_hand_landmarks")]
    pub right_hand: LandmarkSet,
}

impl FrameData {
    fn validate(&self) -> SignplayResult<()> {
        let all = self
            .pose
            .iter()
            .chain(&self.left_hand)
            .chain(&self.right_hand);
        for lm in all {
            if !lm.x.is_finite() || !lm.y.is_finite() {
                return Err(SignplayError::validation(format!(
                    "landmark coordinates must be finite, got ({}, {})",
                    lm.x, lm.y
                )));
            }
        }
        Ok(())
    }
}

/// One gesture clip.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    /// Frames in playback order.
    pub frames: Vec<FrameData>,
}

impl Sequence {
    /// Wrap an ordered frame list.
    pub fn new(frames: Vec<FrameData>) -> Self {
        Self { frames }
    }

    /// Parse a clip (a bare JSON array of frames) from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SignplayResult<Self> {
        let seq: Sequence = serde_json::from_reader(r)
            .map_err(|e| SignplayError::serde(format!("parse sequence JSON: {e}")))?;
        for f in &seq.frames {
            f.validate()?;
        }
        Ok(seq)
    }

    /// Parse a clip from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SignplayResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SignplayError::validation(format!("open sequence JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of frames in this clip.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the clip has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Ordered clips that play back-to-back as one animation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignSequenceSet {
    /// Clips in playback order.
    pub sequences: Vec<Sequence>,
}

impl SignSequenceSet {
    /// Build a set from clips.
    pub fn new(sequences: Vec<Sequence>) -> Self {
        Self { sequences }
    }

    /// Parse `{ "sequences": [...] }` from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SignplayResult<Self> {
        let set: SignSequenceSet = serde_json::from_reader(r)
            .map_err(|e| SignplayError::serde(format!("parse sequence set JSON: {e}")))?;
        set.validate()?;
        Ok(set)
    }

    /// Parse a sequence set from a JSON string.
    pub fn from_json_str(s: &str) -> SignplayResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a sequence set from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SignplayResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SignplayError::validation(format!(
                "open sequence set JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every landmark has finite coordinates.
    pub fn validate(&self) -> SignplayResult<()> {
        self.sequences
            .iter()
            .flat_map(|s| &s.frames)
            .try_for_each(FrameData::validate)
    }

    /// Total frames across all clips.
    pub fn total_frames(&self) -> u64 {
        self.sequences.iter().map(|s| s.frames.len() as u64).sum()
    }

    /// Return `true` when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.total_frames() == 0
    }

    /// Concatenate all clips into one flat frame list. Clip boundaries are not preserved.
    pub fn into_frames(self) -> Vec<FrameData> {
        self.sequences.into_iter().flat_map(|s| s.frames).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/landmark.rs"]
mod tests;
