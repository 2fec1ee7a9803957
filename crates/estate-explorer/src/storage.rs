//! .estate bundle format: every artifact table in one file.

use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::analytics::MarketDataset;
use crate::domain::AttributeDomains;
use crate::index::PropertyIndex;
use crate::store::ArtifactStore;
use crate::tables::{DistanceTable, SimilarityMatrices};
use crate::types::{EstateError, EstateResult};

/// Magic bytes: "ESTA"
const ESTA_MAGIC: u32 = 0x45535441;

/// Current format version.
const FORMAT_VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 64;

/// Flag bit: payload carries market listings.
const FLAG_MARKET: u16 = 1;
/// Flag bit: payload carries feature text.
const FLAG_FEATURE_TEXT: u16 = 1 << 1;

/// Writer for .estate files.
pub struct EstateWriter;

/// Reader for .estate files.
pub struct EstateReader;

impl EstateWriter {
    /// Write a store to a file.
    pub fn write_to_file(store: &ArtifactStore, path: &Path) -> EstateResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(path)?;
        Self::write_to(store, &mut file)
    }

    /// Write a store to any writer.
    pub fn write_to<W: Write>(store: &ArtifactStore, writer: &mut W) -> EstateResult<()> {
        let payload = serde_json::to_vec(&BundlePayload {
            properties: store.index().clone(),
            landmarks: store.landmarks().to_vec(),
            distances: rows_with_gaps(store.distances().meters()),
            by_name: rows(&store.similarity().by_name),
            by_location: rows(&store.similarity().by_location),
            by_facilities: rows(&store.similarity().by_facilities),
            domains: store.domains().clone(),
            market: store.market_opt().cloned(),
            feature_text: store.feature_text_opt().map(str::to_string),
        })
        .map_err(|e| EstateError::ArtifactLoad(format!("Serialization failed: {e}")))?;

        let mut flags = 0u16;
        if store.market_opt().is_some() {
            flags |= FLAG_MARKET;
        }
        if store.feature_text_opt().is_some() {
            flags |= FLAG_FEATURE_TEXT;
        }

        let mut header = [0u8; HEADER_SIZE];
        write_u32(&mut header[0..4], ESTA_MAGIC);
        write_u16(&mut header[4..6], FORMAT_VERSION);
        write_u16(&mut header[6..8], flags);
        write_u64(&mut header[8..16], store.index().len() as u64);
        write_u32(&mut header[16..20], store.landmarks().len() as u32);
        write_u64(&mut header[40..48], payload.len() as u64);

        writer.write_all(&header)?;
        writer.write_all(&payload)?;

        tracing::debug!("Wrote bundle: {} payload bytes", payload.len());
        Ok(())
    }
}

impl EstateReader {
    /// Read a store from a file.
    pub fn read_from_file(path: &Path) -> EstateResult<ArtifactStore> {
        let mut file = std::fs::File::open(path)?;
        Self::read_from(&mut file)
    }

    /// Read a store from any reader. Alignment is re-checked on the way in.
    pub fn read_from<R: Read>(reader: &mut R) -> EstateResult<ArtifactStore> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(truncated("header"))?;

        let magic = read_u32(&header[0..4]);
        if magic != ESTA_MAGIC {
            return Err(EstateError::ArtifactLoad(format!(
                "Invalid magic: expected 0x{ESTA_MAGIC:08X}, got 0x{magic:08X}"
            )));
        }

        let version = read_u16(&header[4..6]);
        if version != FORMAT_VERSION {
            return Err(EstateError::ArtifactLoad(format!(
                "Unsupported version: {version}"
            )));
        }

        let property_count = read_u64(&header[8..16]) as usize;
        let landmark_count = read_u32(&header[16..20]) as usize;
        let payload_len = read_u64(&header[40..48]) as usize;

        let mut payload = Vec::new();
        reader
            .by_ref()
            .take(payload_len as u64)
            .read_to_end(&mut payload)?;
        if payload.len() != payload_len {
            return Err(EstateError::ArtifactLoad(format!(
                "Truncated bundle payload: {} of {payload_len} bytes",
                payload.len()
            )));
        }

        let bundle: BundlePayload = serde_json::from_slice(&payload)
            .map_err(|e| EstateError::ArtifactLoad(format!("Deserialization failed: {e}")))?;

        if bundle.properties.len() != property_count || bundle.landmarks.len() != landmark_count {
            return Err(EstateError::ArtifactLoad(format!(
                "Header counts ({property_count} properties, {landmark_count} landmarks) \
                 do not match payload ({}, {})",
                bundle.properties.len(),
                bundle.landmarks.len()
            )));
        }

        bundle.into_store()
    }
}

#[derive(Serialize, Deserialize)]
struct BundlePayload {
    properties: PropertyIndex,
    landmarks: Vec<String>,
    /// `None` marks a missing distance.
    distances: Vec<Vec<Option<f64>>>,
    by_name: Vec<Vec<f64>>,
    by_location: Vec<Vec<f64>>,
    by_facilities: Vec<Vec<f64>>,
    domains: AttributeDomains,
    market: Option<MarketDataset>,
    feature_text: Option<String>,
}

impl BundlePayload {
    fn into_store(self) -> EstateResult<ArtifactStore> {
        let n = self.properties.len();
        let meters = matrix(
            self.distances
                .into_iter()
                .map(|row| row.into_iter().map(|d| d.unwrap_or(f64::NAN)).collect())
                .collect(),
            n,
            self.landmarks.len(),
            "distances",
        )?;
        let distances = DistanceTable::new(self.landmarks, meters)?;
        let similarity = SimilarityMatrices::new(
            matrix(self.by_name, n, n, "by_name")?,
            matrix(self.by_location, n, n, "by_location")?,
            matrix(self.by_facilities, n, n, "by_facilities")?,
        )?;

        let mut store = ArtifactStore::new(self.properties, distances, similarity, self.domains)?;
        if let Some(market) = self.market {
            store = store.with_market(market);
        }
        if let Some(text) = self.feature_text {
            store = store.with_feature_text(text);
        }
        Ok(store)
    }
}

fn rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|r| r.to_vec()).collect()
}

fn rows_with_gaps(m: &Array2<f64>) -> Vec<Vec<Option<f64>>> {
    m.rows()
        .into_iter()
        .map(|r| r.iter().map(|d| (!d.is_nan()).then_some(*d)).collect())
        .collect()
}

fn matrix(rows: Vec<Vec<f64>>, nrows: usize, ncols: usize, what: &str) -> EstateResult<Array2<f64>> {
    if rows.len() != nrows || rows.iter().any(|r| r.len() != ncols) {
        return Err(EstateError::ArtifactLoad(format!(
            "Bundle table '{what}' is not {nrows}x{ncols}"
        )));
    }
    Array2::from_shape_vec((nrows, ncols), rows.into_iter().flatten().collect())
        .map_err(|e| EstateError::ArtifactLoad(format!("Bundle table '{what}': {e}")))
}

fn truncated(part: &'static str) -> impl Fn(std::io::Error) -> EstateError {
    move |e| match e.kind() {
        ErrorKind::UnexpectedEof => EstateError::ArtifactLoad(format!("Truncated bundle {part}")),
        _ => EstateError::Io(e),
    }
}

// Little-endian byte helpers
fn write_u16(buf: &mut [u8], val: u16) {
    buf[..2].copy_from_slice(&val.to_le_bytes());
}
fn write_u32(buf: &mut [u8], val: u32) {
    buf[..4].copy_from_slice(&val.to_le_bytes());
}
fn write_u64(buf: &mut [u8], val: u64) {
    buf[..8].copy_from_slice(&val.to_le_bytes());
}
fn read_u16(buf: &[u8]) -> u16 {
    u16::from_le_bytes([buf[0], buf[1]])
}
fn read_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}
fn read_u64(buf: &[u8]) -> u64 {
    u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::tests::MARKET;
    use crate::store::tests::write_fixture;
    use crate::store::MARKET_FILE;
    use crate::types::SimilarityWeights;

    fn fixture_store(with_optional: bool) -> ArtifactStore {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), with_optional);
        ArtifactStore::load_dir(dir.path()).unwrap()
    }

    #[test]
    fn test_roundtrip_preserves_queries() {
        let store = fixture_store(true);
        let mut buf = Vec::new();
        EstateWriter::write_to(&store, &mut buf).unwrap();

        let loaded = EstateReader::read_from(&mut &buf[..]).unwrap();
        assert_eq!(loaded.stats(), store.stats());
        assert_eq!(
            loaded.nearby("Cyber Hub", 2.0).unwrap(),
            store.nearby("Cyber Hub", 2.0).unwrap()
        );
        // Missing distances survive as missing, not zero.
        assert_eq!(
            loaded.nearby("Airport", 100.0).unwrap().len(),
            store.nearby("Airport", 100.0).unwrap().len()
        );
        let w = SimilarityWeights::default();
        assert_eq!(
            loaded.recommend("Beta Residency", 5, &w).unwrap(),
            store.recommend("Beta Residency", 5, &w).unwrap()
        );
        assert_eq!(loaded.domains(), store.domains());
    }

    #[test]
    fn test_non_finite_market_never_reaches_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), true);
        let market = MARKET.replacen("28.40", "NaN", 1);
        std::fs::write(dir.path().join(MARKET_FILE), market).unwrap();

        // Packing starts from a loaded store; the NaN cell stops it here.
        let result = ArtifactStore::load_dir(dir.path());
        assert!(matches!(result, Err(EstateError::ArtifactLoad(_))));

        let store = fixture_store(true);
        let mut buf = Vec::new();
        EstateWriter::write_to(&store, &mut buf).unwrap();
        let loaded = EstateReader::read_from(&mut &buf[..]).unwrap();
        assert_eq!(loaded.market().unwrap(), store.market().unwrap());
    }

    #[test]
    fn test_header_layout() {
        let store = fixture_store(true);
        let mut buf = Vec::new();
        EstateWriter::write_to(&store, &mut buf).unwrap();

        assert_eq!(read_u32(&buf[0..4]), ESTA_MAGIC);
        assert_eq!(read_u16(&buf[4..6]), FORMAT_VERSION);
        assert_eq!(read_u16(&buf[6..8]), FLAG_MARKET | FLAG_FEATURE_TEXT);
        assert_eq!(read_u64(&buf[8..16]), 3);
        assert_eq!(read_u32(&buf[16..20]), 2);
        assert_eq!(read_u64(&buf[40..48]) as usize, buf.len() - HEADER_SIZE);
    }

    #[test]
    fn test_invalid_magic() {
        let mut buf = [0u8; HEADER_SIZE + 10];
        buf[0..4].copy_from_slice(b"NOPE");
        let result = EstateReader::read_from(&mut &buf[..]);
        assert!(matches!(result, Err(EstateError::ArtifactLoad(_))));
    }

    #[test]
    fn test_truncated_payload() {
        let store = fixture_store(false);
        let mut buf = Vec::new();
        EstateWriter::write_to(&store, &mut buf).unwrap();
        buf.truncate(buf.len() - 5);
        assert!(matches!(
            EstateReader::read_from(&mut &buf[..]),
            Err(EstateError::ArtifactLoad(_))
        ));
    }

    #[test]
    fn test_file_roundtrip_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("gurgaon.estate");

        let store = fixture_store(false);
        EstateWriter::write_to_file(&store, &path).unwrap();
        let loaded = ArtifactStore::load(&path).unwrap();
        assert_eq!(loaded.stats().properties, 3);
        assert!(loaded.market().is_err());
    }
}
