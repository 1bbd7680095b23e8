//! Text encoding of polygons.
//!
//! A polygon line is the vertex count, one parenthesised group per vertex
//! and then the polygon's auxiliary data:
//!
//! ```text
//! 4 ( 0 0 0 0 0 ) ( 1 0 0 1 0 ) ( 1 1 0 1 1 ) ( 0 1 0 0 1 ) stone
//! 3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 1
//! 4 ( 0 0 0 ) ( 0 1 0 ) ( 0 1 1 ) ( 0 0 1 ) [ 2 5 ]
//! ```

use std::io::{BufRead, Write};

use nalgebra::Point3;

use crate::error::{CompileError, CompileResult};
use crate::portal::PortalInfo;
use crate::{CollisionInfo, Polygon, TextureName, TexturedVertex, Vertex};

use super::lines::{at_line, LineReader, Tokens};

/// A value with a whitespace-token text form.
pub trait TextValue: Sized {
    fn write_tokens(&self, out: &mut String) -> CompileResult<()>;
    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self>;
}

impl TextValue for Point3<f64> {
    fn write_tokens(&self, out: &mut String) -> CompileResult<()> {
        out.push_str(&format!("{} {} {}", self.x, self.y, self.z));
        Ok(())
    }

    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self> {
        Ok(Point3::new(
            tokens.parse("an x coordinate")?,
            tokens.parse("a y coordinate")?,
            tokens.parse("a z coordinate")?,
        ))
    }
}

impl TextValue for TexturedVertex {
    fn write_tokens(&self, out: &mut String) -> CompileResult<()> {
        self.position.write_tokens(out)?;
        out.push_str(&format!(" {} {}", self.u, self.v));
        Ok(())
    }

    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self> {
        let position = Point3::read_tokens(tokens)?;
        Ok(TexturedVertex::new(
            position,
            tokens.parse("a u texture coordinate")?,
            tokens.parse("a v texture coordinate")?,
        ))
    }
}

impl TextValue for TextureName {
    /// Names are written as a single token, so they must be non-empty and
    /// free of whitespace.
    fn write_tokens(&self, out: &mut String) -> CompileResult<()> {
        if self.0.is_empty() || self.0.contains(char::is_whitespace) {
            return Err(CompileError::format(format!(
                "texture name `{}` is not a single token",
                self.0
            )));
        }
        out.push_str(&self.0);
        Ok(())
    }

    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self> {
        Ok(TextureName(tokens.next_token("a texture name")?.to_owned()))
    }
}

impl TextValue for CollisionInfo {
    fn write_tokens(&self, out: &mut String) -> CompileResult<()> {
        out.push(if self.walkable { '1' } else { '0' });
        Ok(())
    }

    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self> {
        match tokens.next_token("a walkable flag")? {
            "0" => Ok(CollisionInfo { walkable: false }),
            "1" => Ok(CollisionInfo { walkable: true }),
            other => Err(CompileError::format(format!(
                "expected a walkable flag (0 or 1), found `{other}`"
            ))),
        }
    }
}

impl TextValue for PortalInfo {
    fn write_tokens(&self, out: &mut String) -> CompileResult<()> {
        out.push_str(&format!("[ {} {} ]", self.front_leaf, self.back_leaf));
        Ok(())
    }

    fn read_tokens(tokens: &mut Tokens<'_>) -> CompileResult<Self> {
        tokens.expect("[")?;
        let front_leaf = tokens.parse("a front leaf index")?;
        let back_leaf = tokens.parse("a back leaf index")?;
        tokens.expect("]")?;
        Ok(PortalInfo::new(front_leaf, back_leaf))
    }
}

/// Formats one polygon line (without a line terminator).
pub fn polygon_to_line<V, A>(polygon: &Polygon<V, A>) -> CompileResult<String>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut line = polygon.len().to_string();
    for vertex in polygon.vertices() {
        line.push_str(" ( ");
        vertex.write_tokens(&mut line)?;
        line.push_str(" )");
    }
    line.push(' ');
    polygon.aux().write_tokens(&mut line)?;
    Ok(line)
}

/// Parses one polygon line.
pub fn polygon_from_line<V, A>(line: &str) -> CompileResult<Polygon<V, A>>
where
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let mut tokens = Tokens::new(line);
    let count: usize = tokens.parse("a vertex count")?;
    if count < 3 {
        return Err(CompileError::format(format!(
            "a polygon needs at least 3 vertices, found {count}"
        )));
    }
    let mut vertices = Vec::new();
    for _ in 0..count {
        tokens.expect("(")?;
        vertices.push(V::read_tokens(&mut tokens)?);
        tokens.expect(")")?;
    }
    let aux = A::read_tokens(&mut tokens)?;
    tokens.finish()?;
    Ok(Polygon::new(vertices, aux))
}

/// Writes `count` followed by one polygon per line.
pub fn write_polygon_lines<W, V, A>(out: &mut W, polygons: &[Polygon<V, A>]) -> CompileResult<()>
where
    W: Write,
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    writeln!(out, "{}", polygons.len())?;
    for polygon in polygons {
        writeln!(out, "{}", polygon_to_line(polygon)?)?;
    }
    Ok(())
}

/// Reads a polygon count and that many polygon lines.
pub fn read_polygon_lines<R, V, A>(reader: &mut LineReader<R>) -> CompileResult<Vec<Polygon<V, A>>>
where
    R: BufRead,
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    let count: usize = reader.read_value("a polygon count")?;
    let mut polygons = Vec::new();
    for _ in 0..count {
        let line = reader.read_line("a polygon")?;
        let polygon = polygon_from_line(&line).map_err(|e| at_line(reader.line_number(), e))?;
        polygons.push(polygon);
    }
    Ok(polygons)
}

/// Writes a `Polygons` section.
pub fn write_polygons_section<W, V, A>(out: &mut W, polygons: &[Polygon<V, A>]) -> CompileResult<()>
where
    W: Write,
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    writeln!(out, "Polygons")?;
    writeln!(out, "{{")?;
    write_polygon_lines(out, polygons)?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Reads a `Polygons` section.
pub fn read_polygons_section<R, V, A>(reader: &mut LineReader<R>) -> CompileResult<Vec<Polygon<V, A>>>
where
    R: BufRead,
    V: Vertex + TextValue,
    A: Clone + TextValue,
{
    reader.begin_section("Polygons")?;
    let polygons = read_polygon_lines(reader)?;
    reader.end_section()?;
    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollisionPolygon, RenderingPolygon};
    use std::io::Cursor;

    fn make_textured_triangle() -> RenderingPolygon {
        Polygon::new(
            vec![
                TexturedVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0),
                TexturedVertex::new(Point3::new(1.5, 0.0, 0.0), 1.0, 0.0),
                TexturedVertex::new(Point3::new(0.0, 2.0, -0.25), 0.0, 1.0),
            ],
            TextureName("stone".to_owned()),
        )
    }

    #[test]
    fn rendering_polygon_line() {
        let line = polygon_to_line(&make_textured_triangle()).unwrap();
        assert_eq!(line, "3 ( 0 0 0 0 0 ) ( 1.5 0 0 1 0 ) ( 0 2 -0.25 0 1 ) stone");
        let parsed: RenderingPolygon = polygon_from_line(&line).unwrap();
        assert_eq!(parsed, make_textured_triangle());
    }

    #[test]
    fn collision_and_portal_lines() {
        let parsed: CollisionPolygon =
            polygon_from_line("3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 1").unwrap();
        assert!(parsed.aux().walkable);

        let portal: Polygon<Point3<f64>, PortalInfo> =
            polygon_from_line("3 ( 0 0 0 ) ( 0 1 0 ) ( 0 0 1 ) [ 2 5 ]").unwrap();
        assert_eq!(*portal.aux(), PortalInfo::new(2, 5));
        assert_eq!(polygon_to_line(&portal).unwrap(), "3 ( 0 0 0 ) ( 0 1 0 ) ( 0 0 1 ) [ 2 5 ]");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let bad = [
            "2 ( 0 0 0 ) ( 1 0 0 ) 0",
            "3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 2",
            "3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 ) 0",
            "3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 0 extra",
            "x ( 0 0 0 )",
        ];
        for line in bad {
            assert!(
                polygon_from_line::<Point3<f64>, CollisionInfo>(line).is_err(),
                "accepted `{line}`"
            );
        }
    }

    #[test]
    fn oversized_vertex_count_is_rejected() {
        let line = "99999999999999999 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 0";
        assert!(polygon_from_line::<Point3<f64>, CollisionInfo>(line).is_err());
    }

    #[test]
    fn texture_names_must_be_single_tokens() {
        for name in ["two words", "", "tab\there"] {
            let triangle = make_textured_triangle();
            let polygon = Polygon::new(triangle.vertices().to_vec(), TextureName(name.to_owned()));
            match polygon_to_line(&polygon) {
                Err(CompileError::Format(_)) => {}
                other => panic!("wrote texture `{name}`: {other:?}"),
            }
            assert!(write_polygons_section(&mut Vec::new(), &[polygon]).is_err());
        }
    }

    #[test]
    fn section_errors_carry_line_numbers() {
        let text = "Polygons\n{\n1\n3 ( 0 0 0 ) ( 1 0 0 ) 0\n}\n";
        let mut reader = LineReader::new(Cursor::new(text));
        let err = read_polygons_section::<_, Point3<f64>, CollisionInfo>(&mut reader).unwrap_err();
        assert!(err.to_string().starts_with("line 4:"));

        let oversized = "Polygons\n{\n99999999999999999\n3 ( 0 0 0 ) ( 1 0 0 ) ( 0 1 0 ) 0\n}\n";
        let mut reader = LineReader::new(Cursor::new(oversized));
        assert!(read_polygons_section::<_, Point3<f64>, CollisionInfo>(&mut reader).is_err());
    }

    #[test]
    fn section_round_trip() {
        let polygons = vec![make_textured_triangle(), make_textured_triangle().flipped()];
        let mut out = Vec::new();
        write_polygons_section(&mut out, &polygons).unwrap();
        let mut reader = LineReader::new(Cursor::new(out));
        let loaded: Vec<RenderingPolygon> = read_polygons_section(&mut reader).unwrap();
        assert_eq!(loaded, polygons);
    }
}
