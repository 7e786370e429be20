//! Strong-beam residual histogram extraction
//!
//! ATL06 granules carry six ground tracks, `gt1l` through `gt3r`. Each pair
//! has one strong and one weak beam, recorded in the `atlas_beam_type`
//! attribute of the track group. The strong side is read from pair 1 only
//! and applied to pairs 2 and 3: the spacecraft orientation fixes the same
//! side for a whole acquisition. Granules that break that assumption are
//! extracted from the side pair 1 reports.

use crate::error::{ExtractionError, Result};
use crate::store::HierarchicalStore;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Attribute holding `strong` or `weak` on each track group
pub const BEAM_TYPE_ATTRIBUTE: &str = "atlas_beam_type";

/// Track whose beam type decides the strong side for the granule
pub const REFERENCE_TRACK: &str = "gt1l";

/// Suffix inserted before the artifact extension
const ARTIFACT_TAG: &str = "_hist_";

/// Granule extension replaced in artifact names
const GRANULE_EXTENSION: &str = ".h5";

/// Artifact extension
const ARTIFACT_EXTENSION: &str = "npy";

/// Which side of a beam pair carries the strong beam
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamSide {
    /// `l` tracks
    Left,
    /// `r` tracks
    Right,
}

impl BeamSide {
    /// Track-name suffix (`l` or `r`)
    pub fn as_char(self) -> char {
        match self {
            BeamSide::Left => 'l',
            BeamSide::Right => 'r',
        }
    }

    /// Strong side implied by the reference track's beam type
    pub fn from_reference_beam_type(beam_type: &str) -> Self {
        if beam_type == "strong" {
            BeamSide::Left
        } else {
            BeamSide::Right
        }
    }
}

/// One of the three beam pairs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamPair {
    /// Pair 1 (`gt1l`/`gt1r`)
    One,
    /// Pair 2 (`gt2l`/`gt2r`)
    Two,
    /// Pair 3 (`gt3l`/`gt3r`)
    Three,
}

impl BeamPair {
    /// All pairs in ascending order
    pub const ALL: [BeamPair; 3] = [BeamPair::One, BeamPair::Two, BeamPair::Three];

    /// Pair number (1-3)
    pub fn index(self) -> u8 {
        match self {
            BeamPair::One => 1,
            BeamPair::Two => 2,
            BeamPair::Three => 3,
        }
    }

    /// Ground track on `side` of this pair
    pub fn track(self, side: BeamSide) -> GroundTrack {
        GroundTrack { pair: self, side }
    }
}

/// A single ground track, e.g. `gt2r`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundTrack {
    /// Beam pair
    pub pair: BeamPair,
    /// Side within the pair
    pub side: BeamSide,
}

impl GroundTrack {
    /// In-file path of this track's residual histogram counts
    pub fn histogram_dataset(&self) -> String {
        format!("{}/residual_histogram/count", self)
    }
}

impl fmt::Display for GroundTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gt{}{}", self.pair.index(), self.side.as_char())
    }
}

/// Artifact path for `track`, next to the granule
///
/// `processed_ATL06_..._01.h5` becomes `processed_ATL06_..._01_hist_gt1l.npy`.
/// A name without the `.h5` extension keeps its full name as the stem.
pub fn artifact_path(granule: &Path, track: GroundTrack) -> Result<PathBuf> {
    let name = granule
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractionError::FileAccess {
            path: granule.to_path_buf(),
            reason: "granule path has no usable file name".to_string(),
        })?;

    let stem = name.strip_suffix(GRANULE_EXTENSION).unwrap_or(name);

    Ok(granule.with_file_name(format!(
        "{}{}{}.{}",
        stem, ARTIFACT_TAG, track, ARTIFACT_EXTENSION
    )))
}

/// Reads strong-beam histograms from granules and writes them as `.npy`
pub struct BeamHistogramExtractor<S> {
    store: S,
}

impl<S: HierarchicalStore> BeamHistogramExtractor<S> {
    /// Create an extractor reading through `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Extract all three strong-beam histograms from `granule`
    ///
    /// Returns the artifact paths in pair order. The granule is opened once
    /// and released on every exit path. Existing artifacts are overwritten.
    ///
    /// # Errors
    ///
    /// - `FileAccess` when the granule cannot be opened
    /// - `AttributeNotFound` when the reference track has no beam type
    /// - `DatasetNotFound` when any pair lacks its histogram; artifacts written
    ///   for earlier pairs are left in place
    /// - `ArtifactWrite` when an artifact cannot be written
    pub fn extract_all(&self, granule: &Path) -> Result<Vec<PathBuf>> {
        info!(?granule, store = self.store.name(), "extracting residual histograms");

        let handle = self.store.open(granule)?;

        let beam_type = handle.read_attribute(REFERENCE_TRACK, BEAM_TYPE_ATTRIBUTE)?;
        let side = BeamSide::from_reference_beam_type(&beam_type);
        debug!(%beam_type, side = %side.as_char(), "strong side chosen from {}", REFERENCE_TRACK);

        let mut artifacts = Vec::with_capacity(BeamPair::ALL.len());

        for pair in BeamPair::ALL {
            let track = pair.track(side);
            let counts = handle.read_dataset(&track.histogram_dataset())?;
            let target = artifact_path(granule, track)?;

            counts.write_npy(&target)?;

            info!(
                %track,
                dtype = counts.dtype(),
                shape = ?counts.shape(),
                ?target,
                "saved residual histogram"
            );
            artifacts.push(target);
        }

        Ok(artifacts)
    }
}
