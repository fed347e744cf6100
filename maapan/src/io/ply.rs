//! Point cloud files.
//!
//! Reads ASCII PLY (vertex `x`, `y`, `z` properties; other properties and
//! elements are skipped) and plain whitespace-separated XYZ text. Writes
//! ASCII PLY with optional color and label properties.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FormatError;
use crate::core::{Color, Point};
use crate::evaluation::LabeledPoint;

/// Read a point cloud, detecting PLY by its magic line.
pub fn read_point_cloud(path: &Path) -> Result<Vec<Point>, FormatError> {
    let text = std::fs::read_to_string(path)?;
    parse_point_cloud(&text)
}

/// Parse point cloud text (ASCII PLY or XYZ).
pub fn parse_point_cloud(text: &str) -> Result<Vec<Point>, FormatError> {
    if text.trim_start().starts_with("ply") {
        parse_ply(text)
    } else {
        parse_xyz(text)
    }
}

fn parse_xyz(text: &str) -> Result<Vec<Point>, FormatError> {
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace().map(str::parse::<f32>);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z))) => points.push(Point::new(x, y, z)),
            _ => return Err(FormatError::parse(i + 1, "expected three coordinates")),
        }
    }
    Ok(points)
}

/// Shortest possible ASCII vertex row: `0 0 0\n`.
const MIN_ROW_BYTES: usize = 6;

/// Header element: name, row count, property names.
struct Element {
    name: String,
    count: usize,
    properties: Vec<String>,
}

fn parse_ply(text: &str) -> Result<Vec<Point>, FormatError> {
    let mut lines = text.lines().enumerate();
    let mut elements: Vec<Element> = Vec::new();

    // Header.
    let mut header_done = false;
    for (i, line) in lines.by_ref() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("ply") | Some("comment") | Some("obj_info") | None => {}
            Some("format") => {
                if tokens.next() != Some("ascii") {
                    return Err(FormatError::parse(i + 1, "only ASCII PLY is supported"));
                }
            }
            Some("element") => {
                let name = tokens.next().unwrap_or_default().to_string();
                let count = tokens
                    .next()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(|| FormatError::parse(i + 1, "bad element count"))?;
                elements.push(Element {
                    name,
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let Some(element) = elements.last_mut() else {
                    return Err(FormatError::parse(i + 1, "property before element"));
                };
                let name = tokens.last().unwrap_or_default().to_string();
                element.properties.push(name);
            }
            Some("end_header") => {
                header_done = true;
                break;
            }
            Some(other) => {
                return Err(FormatError::parse(i + 1, format!("unknown header keyword '{other}'")));
            }
        }
    }
    if !header_done {
        return Err(FormatError::Invalid("missing end_header".to_string()));
    }

    let mut points = Vec::new();
    for element in &elements {
        if element.name != "vertex" {
            // Skip rows of other elements.
            for _ in 0..element.count {
                if lines.next().is_none() {
                    return Err(FormatError::Invalid(format!("truncated '{}' element", element.name)));
                }
            }
            continue;
        }

        let column = |axis: &str| {
            element
                .properties
                .iter()
                .position(|p| p == axis)
                .ok_or_else(|| FormatError::Invalid(format!("vertex has no '{axis}' property")))
        };
        let (cx, cy, cz) = (column("x")?, column("y")?, column("z")?);

        // Header counts are untrusted; the text bounds how many rows can follow
        points.reserve(element.count.min(text.len() / MIN_ROW_BYTES));
        for _ in 0..element.count {
            let Some((i, line)) = lines.next() else {
                return Err(FormatError::Invalid("truncated vertex element".to_string()));
            };
            let values: Vec<&str> = line.split_whitespace().collect();
            let coord = |c: usize| -> Result<f32, FormatError> {
                values
                    .get(c)
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| FormatError::parse(i + 1, "bad vertex coordinate"))
            };
            points.push(Point::new(coord(cx)?, coord(cy)?, coord(cz)?));
        }
    }
    Ok(points)
}

fn write_ply<W: Write>(
    writer: &mut W,
    count: usize,
    extra_properties: &[&str],
    mut row: impl FnMut(&mut W, usize) -> std::io::Result<()>,
) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {count}")?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    for property in extra_properties {
        writeln!(writer, "property {property}")?;
    }
    writeln!(writer, "end_header")?;
    for i in 0..count {
        row(writer, i)?;
    }
    writer.flush()
}

/// Write bare points.
pub fn write_points(path: &Path, points: &[Point]) -> Result<(), FormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(&mut writer, points.len(), &[], |w, i| {
        let p = points[i];
        writeln!(w, "{} {} {}", p.x, p.y, p.z)
    })?;
    Ok(())
}

/// Write colored points (e.g. mesh vertices).
pub fn write_colored_points(path: &Path, points: &[Point], colors: &[Color]) -> Result<(), FormatError> {
    if points.len() != colors.len() {
        return Err(FormatError::Invalid(format!(
            "{} points but {} colors",
            points.len(),
            colors.len()
        )));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(
        &mut writer,
        points.len(),
        &["uchar red", "uchar green", "uchar blue"],
        |w, i| {
            let (p, c) = (points[i], colors[i]);
            writeln!(w, "{} {} {} {} {} {}", p.x, p.y, p.z, c.r, c.g, c.b)
        },
    )?;
    Ok(())
}

/// Write labeled, colored points.
pub fn write_labeled_points(path: &Path, points: &[LabeledPoint]) -> Result<(), FormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(
        &mut writer,
        points.len(),
        &["uchar red", "uchar green", "uchar blue", "uint label"],
        |w, i| {
            let LabeledPoint {
                position: p,
                color: c,
                label,
            } = points[i];
            writeln!(w, "{} {} {} {} {} {} {}", p.x, p.y, p.z, c.r, c.g, c.b, label)
        },
    )?;
    Ok(())
}
