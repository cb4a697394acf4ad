/// Wavefront OBJ reader and writer for polygonal meshes
///
/// Only positions (`v`) and faces (`f`) are kept. Texture and normal
/// references on face corners are read past and never written back.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{eof, map_res, rest},
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, warn};

use crate::error::{MeshError, ParseError, Result};
use crate::geometry::{Face, Mesh, Vertex};

/// First line of every exported file
pub const EXPORT_HEADER: &str = "# Exported from ModelViewer";

/// Digits kept after the decimal point when writing coordinates
const COORDINATE_PRECISION: usize = 6;

/// What to do with faces whose indices fall outside the vertex list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Keep them; they are skipped later when projected or picked
    #[default]
    Lenient,
    /// Fail the whole parse
    Reject,
    /// Remove them after parsing
    Drop,
}

/// One meaningful line of an OBJ file
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Vertex(Vertex),
    Face(Face),
    Unknown(String),
}

/// Classify a single line
///
/// Returns `Ok(None)` for blank lines, comments, and `v`/`f` records that
/// are too short or whose face indices do not parse. Only a bad vertex
/// coordinate is an error.
pub fn parse_record(line: &str, line_number: usize) -> std::result::Result<Option<Record>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(kind) = tokens.next() else {
        return Ok(None);
    };
    let fields: Vec<&str> = tokens.collect();

    match kind {
        "v" => {
            if fields.len() < 3 {
                debug!(line = line_number, "Ignoring vertex with fewer than 3 coordinates");
                return Ok(None);
            }
            let mut xyz = [0.0; 3];
            for (slot, token) in xyz.iter_mut().zip(&fields) {
                *slot = coordinate(token)
                    .map(|(_, value)| value)
                    .map_err(|_| ParseError::NumericFormat {
                        line: line_number,
                        token: (*token).to_string(),
                    })?;
            }
            Ok(Some(Record::Vertex(Vertex::new(xyz[0], xyz[1], xyz[2]))))
        }
        "f" => {
            if fields.len() < 3 {
                debug!(line = line_number, "Ignoring face with fewer than 3 corners");
                return Ok(None);
            }
            let indices: Option<Vec<usize>> = fields
                .iter()
                .map(|token| match face_index(token) {
                    Ok((_, index)) if index > 0 => Some(index - 1),
                    _ => None,
                })
                .collect();
            match indices {
                Some(indices) => Ok(Some(Record::Face(Face::new(indices)))),
                None => {
                    warn!(line = line_number, "Ignoring face with malformed vertex index");
                    Ok(None)
                }
            }
        }
        other => Ok(Some(Record::Unknown(other.to_string()))),
    }
}

/// Any token Rust accepts as an `f64`, including `-inf`, `infinity` and `NaN`
fn coordinate(input: &str) -> IResult<&str, f64> {
    map_res(rest, |token: &str| token.parse::<f64>())(input)
}

/// Leading vertex index of a `v`, `v/t`, `v//n` or `v/t/n` corner
fn face_index(input: &str) -> IResult<&str, usize> {
    terminated(
        map_res(digit1, |digits: &str| digits.parse::<usize>()),
        alt((eof, preceded(char('/'), rest))),
    )(input)
}

fn apply_record(mesh: &mut Mesh, record: Record, line_number: usize) {
    match record {
        Record::Vertex(vertex) => {
            mesh.add_vertex(vertex);
        }
        Record::Face(face) => {
            mesh.add_face(face);
        }
        Record::Unknown(kind) => {
            debug!(line = line_number, kind = %kind, "Skipping unsupported record");
        }
    }
}

fn log_summary(mesh: &Mesh) {
    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Parsed OBJ mesh"
    );
}

fn finish(mut mesh: Mesh, validation: Validation) -> Result<Mesh> {
    match validation {
        Validation::Lenient => {}
        Validation::Reject => mesh.validate()?,
        Validation::Drop => {
            let dropped = mesh.retain_valid_faces();
            if dropped > 0 {
                warn!(dropped, "Removed faces with out-of-range vertex indices");
            }
        }
    }
    log_summary(&mesh);
    Ok(mesh)
}

/// Build a mesh from a fallible line source
fn parse_lines<S, E, I>(lines: I) -> std::result::Result<Mesh, E>
where
    S: AsRef<str>,
    E: From<ParseError>,
    I: IntoIterator<Item = std::result::Result<S, E>>,
{
    let mut mesh = Mesh::new();
    for (i, line) in lines.into_iter().enumerate() {
        if let Some(record) = parse_record(line?.as_ref(), i + 1)? {
            apply_record(&mut mesh, record, i + 1);
        }
    }
    Ok(mesh)
}

/// Parse OBJ text, leaving face indices unchecked
pub fn parse(input: &str) -> std::result::Result<Mesh, ParseError> {
    let mesh = parse_lines(input.lines().map(Ok::<_, ParseError>))?;
    log_summary(&mesh);
    Ok(mesh)
}

/// Parse OBJ text and check face indices according to `validation`
pub fn parse_with(input: &str, validation: Validation) -> Result<Mesh> {
    finish(parse_lines(input.lines().map(Ok::<_, MeshError>))?, validation)
}

/// Read OBJ text line by line from any buffered reader
pub fn read<R: BufRead>(reader: R, validation: Validation) -> Result<Mesh> {
    let lines = reader.lines().map(|line| line.map_err(MeshError::from));
    finish(parse_lines(lines)?, validation)
}

/// Load a mesh from an OBJ file without index validation
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    load_with(path, Validation::Lenient)
}

/// Load a mesh from an OBJ file
pub fn load_with<P: AsRef<Path>>(path: P, validation: Validation) -> Result<Mesh> {
    let path = path.as_ref();
    let result = File::open(path)
        .map_err(MeshError::from)
        .and_then(|file| read(BufReader::new(file), validation));

    result.map_err(|e| MeshError::Load {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Render a coordinate with at most six decimals and no trailing zeros
pub fn format_coordinate(value: f64) -> String {
    let mut text = format!("{:.*}", COORDINATE_PRECISION, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Serialize a mesh to OBJ text
///
/// Indices are written 1-based with empty texture and normal slots
/// (`f 1// 2// 3//`).
pub fn serialize(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(32 * (mesh.vertex_count() + mesh.face_count()) + 64);

    out.push_str(EXPORT_HEADER);
    out.push('\n');
    out.push_str(&format!("# Vertices: {}\n", mesh.vertex_count()));
    out.push_str(&format!("# Faces: {}\n\n", mesh.face_count()));

    for vertex in mesh.vertices() {
        out.push_str(&format!(
            "v {} {} {}\n",
            format_coordinate(vertex.x),
            format_coordinate(vertex.y),
            format_coordinate(vertex.z)
        ));
    }

    out.push('\n');

    for face in mesh.faces() {
        out.push('f');
        for index in face.indices() {
            out.push_str(&format!(" {}//", index + 1));
        }
        out.push('\n');
    }

    out
}

/// Write a mesh as OBJ text
pub fn write<W: Write>(mesh: &Mesh, mut writer: W) -> std::io::Result<()> {
    writer.write_all(serialize(mesh).as_bytes())?;
    writer.flush()
}

/// Save a mesh to an OBJ file
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let result = File::create(path).and_then(|file| write(mesh, BufWriter::new(file)));

    result.map_err(|source| MeshError::Save {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Saved OBJ mesh"
    );
    Ok(())
}
