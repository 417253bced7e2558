// seisgrid/src/psf/sources.rs

use crate::coords::geocentric_xyz;
use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One row of a PSF source list, in geographic units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
    /// Influence radius in kilometres.
    pub radius: f64,
    pub amplitude: f64,
}

/// A source in normalised geocentric Cartesian coordinates, ready for accumulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointSource {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Influence radius in kilometres.
    pub radius: f64,
    pub amplitude: f64,
}

impl PointSource {
    pub fn new(xyz: [f64; 3], radius: f64, amplitude: f64) -> Self {
        Self {
            x: xyz[0],
            y: xyz[1],
            z: xyz[2],
            radius,
            amplitude,
        }
    }
}

impl From<&SourceRecord> for PointSource {
    fn from(record: &SourceRecord) -> Self {
        let xyz = geocentric_xyz(record.latitude, record.longitude, record.depth);
        Self::new(xyz, record.radius, record.amplitude)
    }
}

pub fn to_point_sources(records: &[SourceRecord]) -> Vec<PointSource> {
    records.iter().map(PointSource::from).collect()
}

/// Parses `longitude latitude depth radius amplitude` rows.
///
/// Blank lines and `#` comments are skipped. Any malformed row fails the whole list.
pub fn parse_source_list(content: &str) -> Result<Vec<SourceRecord>, SourceListError> {
    let mut records = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_record(line, index + 1)?);
    }
    debug!("Parsed {} source records", records.len());
    Ok(records)
}

fn parse_record(line: &str, line_number: usize) -> Result<SourceRecord, SourceListError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(SourceListError::MalformedSourceRecord {
            line: line_number,
            reason: format!("expected 5 fields, found {}", fields.len()),
        });
    }
    let mut values = [0f64; 5];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .parse::<f64>()
            .map_err(|e| SourceListError::MalformedSourceRecord {
                line: line_number,
                reason: format!("could not parse {:?}: {}", field, e),
            })?;
    }
    let [longitude, latitude, depth, radius, amplitude] = values;
    Ok(SourceRecord {
        longitude,
        latitude,
        depth,
        radius,
        amplitude,
    })
}

pub fn read_source_list<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRecord>, SourceListError> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_source_list(&content)
}

#[derive(Error, Debug)]
pub enum SourceListError {
    #[error("Malformed source record on line {line}: {reason}")]
    MalformedSourceRecord { line: usize, reason: String },
    #[error("File IO error: {0}")]
    IoError(#[from] std::io::Error),
}
