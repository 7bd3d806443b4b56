//! PLY format I/O for splat clouds.
//!
//! Splats are stored as a binary little-endian vertex element with one float
//! property per field:
//!
//! ```text
//! x y z radius nx ny nz red green blue opacity
//! ```
//!
//! Positions, radii and normals are world-space; colour channels and opacity
//! are linear values in [0, 1]. Standard viewers that understand per-vertex
//! normals render these files directly as point clouds.

use crate::core::{Splat, SplatCloud};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or saving splat PLY files.
#[derive(Debug, Error)]
pub enum PlyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PLY file: {0}")]
    InvalidFormat(String),
}

const PROPERTIES: [&str; 11] = [
    "x", "y", "z", "radius", "nx", "ny", "nz", "red", "green", "blue", "opacity",
];

/// Save a splat cloud to binary PLY.
pub fn save_ply(cloud: &SplatCloud, path: &Path) -> Result<(), PlyError> {
    let mut file = BufWriter::new(File::create(path)?);

    // Write PLY header
    writeln!(file, "ply")?;
    writeln!(file, "format binary_little_endian 1.0")?;
    writeln!(file, "element vertex {}", cloud.len())?;
    for name in PROPERTIES {
        writeln!(file, "property float {}", name)?;
    }
    writeln!(file, "end_header")?;

    // Write vertex data
    for s in &cloud.splats {
        for v in [
            s.centre.x, s.centre.y, s.centre.z, s.radius, s.normal.x, s.normal.y, s.normal.z,
            s.colour.x, s.colour.y, s.colour.z, s.opacity,
        ] {
            file.write_f32::<LittleEndian>(v)?;
        }
    }

    file.flush()?;
    Ok(())
}

/// Load a splat cloud from a binary PLY written by [`save_ply`].
pub fn load_ply(path: &Path) -> Result<SplatCloud, PlyError> {
    let mut reader = BufReader::new(File::open(path)?);

    let count = read_header(&mut reader)?;

    let mut cloud = SplatCloud::new();
    for _ in 0..count {
        let mut fields = [0.0f32; 11];
        for f in fields.iter_mut() {
            *f = reader.read_f32::<LittleEndian>()?;
        }
        cloud.push(Splat {
            centre: Vector3::new(fields[0], fields[1], fields[2]),
            radius: fields[3],
            normal: Vector3::new(fields[4], fields[5], fields[6]),
            colour: Vector3::new(fields[7], fields[8], fields[9]),
            opacity: fields[10],
        });
    }

    Ok(cloud)
}

/// Parse the header, validating format and property layout. Returns the
/// vertex count.
fn read_header<R: Read + BufRead>(reader: &mut R) -> Result<usize, PlyError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim() != "ply" {
        return Err(PlyError::InvalidFormat("missing ply magic".into()));
    }

    let mut count: Option<usize> = None;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::InvalidFormat("unexpected end of header".into()));
        }
        let trimmed = line.trim();
        let mut tokens = trimmed.split_whitespace();

        match tokens.next() {
            Some("format") => {
                if tokens.next() != Some("binary_little_endian") {
                    return Err(PlyError::InvalidFormat(format!(
                        "unsupported format: {}",
                        trimmed
                    )));
                }
            }
            Some("comment") => {}
            Some("element") => {
                if tokens.next() != Some("vertex") {
                    return Err(PlyError::InvalidFormat(format!(
                        "unsupported element: {}",
                        trimmed
                    )));
                }
                let n = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| PlyError::InvalidFormat("bad vertex count".into()))?;
                count = Some(n);
            }
            Some("property") => {
                if tokens.next() != Some("float") {
                    return Err(PlyError::InvalidFormat(format!(
                        "unsupported property type: {}",
                        trimmed
                    )));
                }
                if let Some(name) = tokens.next() {
                    properties.push(name.to_string());
                }
            }
            Some("end_header") => break,
            _ => {
                return Err(PlyError::InvalidFormat(format!(
                    "unexpected header line: {}",
                    trimmed
                )))
            }
        }
    }

    if properties != PROPERTIES {
        return Err(PlyError::InvalidFormat(format!(
            "unexpected property layout: {:?}",
            properties
        )));
    }

    count.ok_or_else(|| PlyError::InvalidFormat("missing vertex element".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cloud() -> SplatCloud {
        let mut cloud = SplatCloud::new();
        cloud.push(Splat::new(
            Vector3::new(0.1, -0.2, 0.3),
            0.05,
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.5, 0.25),
            0.75,
        ));
        cloud.push(Splat::new(
            Vector3::new(-1.0, 2.0, -3.0),
            0.5,
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
        ));
        cloud
    }

    #[test]
    fn test_ply_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splats.ply");

        let cloud = sample_cloud();
        save_ply(&cloud, &path).unwrap();
        let loaded = load_ply(&path).unwrap();

        assert_eq!(loaded.len(), cloud.len());
        for (a, b) in cloud.splats.iter().zip(loaded.splats.iter()) {
            assert_eq!(a.centre, b.centre);
            assert_eq!(a.radius, b.radius);
            assert_eq!(a.normal, b.normal);
            assert_eq!(a.colour, b.colour);
            assert_eq!(a.opacity, b.opacity);
        }
    }

    #[test]
    fn test_rejects_ascii_ply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascii.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 0\nend_header\n",
        )
        .unwrap();

        assert!(matches!(
            load_ply(&path),
            Err(PlyError::InvalidFormat(_))
        ));
    }
}
