use serde::{Deserialize, Serialize};

/// Decoded capture as parallel channel arrays.
///
/// `position` holds xyz triplets and is always present. Every other channel is
/// either empty or holds exactly one entry (intensity) or one triplet (color,
/// normal, velocity) per retained point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub position: Vec<f64>,
    pub intensity: Vec<f32>,
    // r, g, b normalized to 0..1
    pub color: Vec<f32>,
    pub normal: Vec<f32>,
    pub velocity: Vec<f32>,
}

/// Which optional channels a decoder is going to fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channels {
    pub intensity: bool,
    pub color: bool,
    pub normal: bool,
    pub velocity: bool,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for `points` records in every channel listed in `channels`.
    ///
    /// The reservation is best effort: a count that overflows or cannot be
    /// allocated leaves the buffers empty to grow on demand.
    pub fn with_capacity(points: usize, channels: Channels) -> Self {
        fn reserve<T>(enabled: bool, len: Option<usize>) -> Vec<T> {
            let mut buffer = Vec::new();
            if let (true, Some(len)) = (enabled, len) {
                let _ = buffer.try_reserve_exact(len);
            }
            buffer
        }

        PointSet {
            position: reserve(true, points.checked_mul(3)),
            intensity: reserve(channels.intensity, Some(points)),
            color: reserve(channels.color, points.checked_mul(3)),
            normal: reserve(channels.normal, points.checked_mul(3)),
            velocity: reserve(channels.velocity, points.checked_mul(3)),
        }
    }

    pub fn len(&self) -> usize {
        self.position.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn push_position(&mut self, x: f64, y: f64, z: f64) {
        self.position.extend_from_slice(&[x, y, z]);
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.position.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    pub fn channels(&self) -> Channels {
        Channels {
            intensity: !self.intensity.is_empty(),
            color: !self.color.is_empty(),
            normal: !self.normal.is_empty(),
            velocity: !self.velocity.is_empty(),
        }
    }

    /// Checks the channel length invariant against the number of positions.
    pub fn is_consistent(&self) -> bool {
        let n = self.len();
        let fits = |len: usize, width: usize| len == 0 || len == n * width;

        self.position.len() % 3 == 0
            && fits(self.intensity.len(), 1)
            && fits(self.color.len(), 3)
            && fits(self.normal.len(), 3)
            && fits(self.velocity.len(), 3)
    }

    /// Axis-aligned bounds of all positions, `None` for an empty set.
    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        if self.is_empty() {
            return None;
        }

        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        for [x, y, z] in self.positions() {
            bounding_volume.max[0] = bounding_volume.max[0].max(x);
            bounding_volume.max[1] = bounding_volume.max[1].max(y);
            bounding_volume.max[2] = bounding_volume.max[2].max(z);
            bounding_volume.min[0] = bounding_volume.min[0].min(x);
            bounding_volume.min[1] = bounding_volume.min[1].min(y);
            bounding_volume.min[2] = bounding_volume.min[2].min(z);
        }

        Some(bounding_volume)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}
