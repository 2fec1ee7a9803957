//! Dense artifact tables: landmark distances and the three similarity matrices.
//!
//! Both tables are loaded from labelled CSV files. The distance table's row
//! labels define the canonical [`PropertyIndex`]; similarity matrices are
//! re-laid out into that order by label.

use std::collections::HashMap;
use std::io::Read;

use ndarray::{Array2, ArrayView1};

use crate::index::PropertyIndex;
use crate::types::{EstateError, EstateResult};

/// Property × landmark distances in meters. `NaN` marks a missing distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    landmarks: Vec<String>,
    landmark_positions: HashMap<String, usize>,
    meters: Array2<f64>,
}

impl DistanceTable {
    /// Build a table from landmark names and a row-major `properties × landmarks` matrix.
    pub fn new(landmarks: Vec<String>, meters: Array2<f64>) -> EstateResult<Self> {
        if meters.ncols() != landmarks.len() {
            return Err(EstateError::ArtifactLoad(format!(
                "Distance table has {} columns but {} landmarks",
                meters.ncols(),
                landmarks.len()
            )));
        }
        if meters.iter().any(|d| *d < 0.0 || d.is_infinite()) {
            return Err(EstateError::ArtifactLoad(
                "Distance table contains negative or infinite distances".to_string(),
            ));
        }

        let mut landmark_positions = HashMap::with_capacity(landmarks.len());
        for (i, name) in landmarks.iter().enumerate() {
            if landmark_positions.insert(name.clone(), i).is_some() {
                return Err(EstateError::ArtifactLoad(format!(
                    "Duplicate landmark '{name}'"
                )));
            }
        }

        Ok(Self {
            landmarks,
            landmark_positions,
            meters,
        })
    }

    pub fn landmarks(&self) -> &[String] {
        &self.landmarks
    }

    pub fn landmark_position(&self, landmark: &str) -> Option<usize> {
        self.landmark_positions.get(landmark).copied()
    }

    /// Number of property rows.
    pub fn rows(&self) -> usize {
        self.meters.nrows()
    }

    /// All distances to one landmark, indexed by canonical property position.
    pub fn column(&self, landmark_position: usize) -> ArrayView1<'_, f64> {
        self.meters.column(landmark_position)
    }

    pub fn meters(&self) -> &Array2<f64> {
        &self.meters
    }
}

/// Read `location_distance.csv`.
///
/// Header: `property_name,<landmark>...`. Each row is one property; empty
/// cells are missing distances. Returns the canonical property index along
/// with the table.
pub fn read_distance_csv<R: Read>(reader: R) -> EstateResult<(PropertyIndex, DistanceTable)> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| load_error("distance table", e))?
        .clone();

    if headers.len() < 2 {
        return Err(EstateError::ArtifactLoad(
            "Distance table needs a name column and at least one landmark".to_string(),
        ));
    }
    let landmarks: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    if let Some(blank) = landmarks.iter().position(|l| l.is_empty()) {
        return Err(EstateError::ArtifactLoad(format!(
            "Distance table has a blank landmark header in column {}",
            blank + 1
        )));
    }

    let mut names = Vec::new();
    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| load_error("distance table", e))?;
        names.push(record[0].trim().to_string());
        for (col, cell) in record.iter().skip(1).enumerate() {
            values.push(parse_cell(cell, true).ok_or_else(|| {
                EstateError::ArtifactLoad(format!(
                    "Distance table: invalid value '{cell}' at row {row}, landmark '{}'",
                    landmarks[col]
                ))
            })?);
        }
    }

    let rows = names.len();
    let index = PropertyIndex::from_names(names)?;
    let meters = Array2::from_shape_vec((rows, landmarks.len()), values)
        .map_err(|e| EstateError::ArtifactLoad(format!("Distance table shape: {e}")))?;

    let table = DistanceTable::new(landmarks, meters)?;
    Ok((index, table))
}

/// The three property × property similarity matrices, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrices {
    /// Similarity of property names.
    pub by_name: Array2<f64>,
    /// Similarity of location advantages.
    pub by_location: Array2<f64>,
    /// Similarity of facilities and price details.
    pub by_facilities: Array2<f64>,
}

impl SimilarityMatrices {
    pub fn new(
        by_name: Array2<f64>,
        by_location: Array2<f64>,
        by_facilities: Array2<f64>,
    ) -> EstateResult<Self> {
        let matrices = Self {
            by_name,
            by_location,
            by_facilities,
        };
        let n = matrices.by_name.nrows();
        for (label, m) in matrices.labelled() {
            if m.nrows() != n || m.ncols() != n {
                return Err(EstateError::ArtifactLoad(format!(
                    "Similarity matrix '{label}' is {}x{}, expected {n}x{n}",
                    m.nrows(),
                    m.ncols()
                )));
            }
            if m.iter().any(|v| !v.is_finite()) {
                return Err(EstateError::ArtifactLoad(format!(
                    "Similarity matrix '{label}' contains non-finite values"
                )));
            }
        }
        Ok(matrices)
    }

    /// Side length shared by all three matrices.
    pub fn size(&self) -> usize {
        self.by_name.nrows()
    }

    pub(crate) fn labelled(&self) -> [(&'static str, &Array2<f64>); 3] {
        [
            ("name", &self.by_name),
            ("location", &self.by_location),
            ("facilities", &self.by_facilities),
        ]
    }
}

/// Read one labelled similarity matrix and lay it out in canonical order.
///
/// Header: `property_name,<property>...`; each row starts with its property
/// name. Row and column label sets must both equal the index's name set.
pub fn read_similarity_csv<R: Read>(
    reader: R,
    index: &PropertyIndex,
    label: &str,
) -> EstateResult<Array2<f64>> {
    let n = index.len();
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(|e| load_error(label, e))?.clone();

    let column_positions = resolve_labels(headers.iter().skip(1), index, label, "column")?;

    let mut matrix = Array2::<f64>::zeros((n, n));
    let mut seen_rows = vec![false; n];
    let mut row_count = 0usize;

    for record in rdr.records() {
        let record = record.map_err(|e| load_error(label, e))?;
        let name = record[0].trim();
        let row = index.position(name).ok_or_else(|| {
            EstateError::ArtifactLoad(format!(
                "Similarity matrix '{label}': row '{name}' is not a known property"
            ))
        })?;
        if std::mem::replace(&mut seen_rows[row], true) {
            return Err(EstateError::ArtifactLoad(format!(
                "Similarity matrix '{label}': duplicate row '{name}'"
            )));
        }

        for (j, cell) in record.iter().skip(1).enumerate() {
            let value = parse_cell(cell, false).ok_or_else(|| {
                EstateError::ArtifactLoad(format!(
                    "Similarity matrix '{label}': invalid value '{cell}' in row '{name}'"
                ))
            })?;
            matrix[[row, column_positions[j]]] = value;
        }
        row_count += 1;
    }

    if row_count != n {
        return Err(EstateError::ArtifactLoad(format!(
            "Similarity matrix '{label}' has {row_count} rows, expected {n}"
        )));
    }

    Ok(matrix)
}

fn resolve_labels<'a>(
    labels: impl Iterator<Item = &'a str>,
    index: &PropertyIndex,
    matrix: &str,
    axis: &str,
) -> EstateResult<Vec<usize>> {
    let mut seen = vec![false; index.len()];
    let mut positions = Vec::with_capacity(index.len());

    for raw in labels {
        let name = raw.trim();
        let pos = index.position(name).ok_or_else(|| {
            EstateError::ArtifactLoad(format!(
                "Similarity matrix '{matrix}': {axis} '{name}' is not a known property"
            ))
        })?;
        if std::mem::replace(&mut seen[pos], true) {
            return Err(EstateError::ArtifactLoad(format!(
                "Similarity matrix '{matrix}': duplicate {axis} '{name}'"
            )));
        }
        positions.push(pos);
    }

    if positions.len() != index.len() {
        return Err(EstateError::ArtifactLoad(format!(
            "Similarity matrix '{matrix}' has {} {axis}s, expected {}",
            positions.len(),
            index.len()
        )));
    }
    Ok(positions)
}

/// Parse a numeric cell. Blank cells become `NaN` when `allow_missing`.
fn parse_cell(cell: &str, allow_missing: bool) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return allow_missing.then_some(f64::NAN);
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn load_error(what: &str, e: csv::Error) -> EstateError {
    EstateError::ArtifactLoad(format!("{what}: {e}"))
}
