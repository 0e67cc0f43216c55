//! Geometric types
//!
//! All geometric literals are built from `(x,y)` coordinate pairs. The outer
//! delimiters tell the types apart: `{A,B,C}` for lines, `[...]` for line
//! segments and open paths, `<...>` for circles, and `(...)` for the rest.

use super::number::format_float8;
use crate::PgType;
use crate::structure::expect_keys;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use serde_json::{Map, Value, json};
use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// Scanning
// ============================================================================

/// Strip `open ... close` when the pair encloses the whole text
///
/// `(1,2),(3,4)` starts and ends with parentheses, but they do not match
/// each other, so nothing is stripped.
fn strip_enclosing(text: &str, open: char, close: char) -> Option<&str> {
    let inner = text.strip_prefix(open)?.strip_suffix(close)?;
    let mut depth = 0i32;
    for c in inner.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return None;
            }
        }
    }
    (depth == 0).then_some(inner)
}

fn parse_coordinate(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Read one number, stopping at a separator or closing delimiter
fn take_number(text: &str) -> Option<(f64, &str)> {
    let end = text.find([',', ')', ']', '>', '}']).unwrap_or(text.len());
    Some((parse_coordinate(&text[..end])?, &text[end..]))
}

/// Read one point, written as `(x,y)` or bare `x,y`
fn take_point(text: &str) -> Option<(Point, &str)> {
    let text = text.trim_start();
    if let Some(inner) = text.strip_prefix('(') {
        let end = inner.find(')')?;
        let point = parse_pair(&inner[..end])?;
        return Some((point, &inner[end + 1..]));
    }
    let (x, rest) = take_number(text)?;
    let rest = rest.trim_start().strip_prefix(',')?;
    let (y, rest) = take_number(rest)?;
    Some((Point { x, y }, rest))
}

fn parse_pair(text: &str) -> Option<Point> {
    let (x, y) = text.split_once(',')?;
    Some(Point {
        x: parse_coordinate(x)?,
        y: parse_coordinate(y)?,
    })
}

/// Parse a comma separated list of points
fn parse_point_list(text: &str) -> Option<Vec<Point>> {
    let mut points = Vec::new();
    let mut rest = text.trim();
    loop {
        let (point, tail) = take_point(rest)?;
        points.push(point);
        rest = tail.trim_start();
        if rest.is_empty() {
            return Some(points);
        }
        rest = rest.strip_prefix(',')?;
    }
}

fn write_points(f: &mut fmt::Formatter<'_>, points: &[Point]) -> fmt::Result {
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", point)?;
    }
    Ok(())
}

/// Structural form of a coordinate; JSON has no non-finite numbers, so those are written as text
fn coordinate_json(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        Value::String(format_float8(value))
    }
}

fn point_from_json(raw: Option<&Value>, ctx: &mut ParseContext) -> ParseOutcome<Point> {
    match raw {
        Some(Value::Object(object)) => Point::decode_structure(object, &(), ctx),
        Some(Value::String(text)) => Point::decode_text(text, &(), ctx),
        other => ctx.report(Issue::invalid_type(
            "point",
            other.map_or("undefined", pgtext_diagnostics::received_kind),
        )),
    }
}

fn points_from_json(items: &[Value], ctx: &mut ParseContext) -> ParseOutcome<Vec<Point>> {
    let mut points = Vec::with_capacity(items.len());
    for item in items {
        points.push(try_valid!(point_from_json(Some(item), ctx)));
    }
    ParseOutcome::Valid(points)
}

// ============================================================================
// Point
// ============================================================================

/// `point`, written `(x,y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", format_float8(self.x), format_float8(self.y))
    }
}

impl PgType for Point {
    type Config = ();

    fn type_name() -> &'static str {
        "point"
    }

    fn type_oid() -> Option<u32> {
        Some(600)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let body = strip_enclosing(trimmed, '(', ')').unwrap_or(trimmed);
        match parse_pair(body) {
            Some(point) if !body.contains(['(', ')']) => ParseOutcome::Valid(point),
            _ => ctx.report(Issue::invalid_string("point", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["x", "y"], &[], ctx));
        let x = try_valid!(fields.float("x", ctx));
        let y = try_valid!(fields.float("y", ctx));
        ParseOutcome::Valid(Self { x, y })
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({ "x": coordinate_json(self.x), "y": coordinate_json(self.y) })
    }

    crate::value_glue!(Point);
}

// ============================================================================
// Line
// ============================================================================

/// `line`, the infinite line `Ax + By + C = 0`, written `{A,B,C}`
///
/// Also accepts two distinct points on the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    fn through(p: Point, q: Point) -> Option<Self> {
        if p == q {
            return None;
        }
        let a = q.y - p.y;
        let b = p.x - q.x;
        let c = -(a * p.x + b * p.y);
        // avoid printing -0
        let c = if c == 0.0 { 0.0 } else { c };
        Some(Self { a, b, c })
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{},{},{}}}",
            format_float8(self.a),
            format_float8(self.b),
            format_float8(self.c)
        )
    }
}

impl PgType for Line {
    type Config = ();

    fn type_name() -> &'static str {
        "line"
    }

    fn type_oid() -> Option<u32> {
        Some(628)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let line = if let Some(body) = strip_enclosing(trimmed, '{', '}') {
            let parts: Vec<Option<f64>> = body.split(',').map(parse_coordinate).collect();
            match parts.as_slice() {
                [Some(a), Some(b), Some(c)] if *a != 0.0 || *b != 0.0 => Some(Self {
                    a: *a,
                    b: *b,
                    c: *c,
                }),
                _ => None,
            }
        } else {
            let body = strip_enclosing(trimmed, '[', ']')
                .or_else(|| strip_enclosing(trimmed, '(', ')'))
                .unwrap_or(trimmed);
            match parse_point_list(body).as_deref() {
                Some([p, q]) => Self::through(*p, *q),
                _ => None,
            }
        };
        match line {
            Some(line) => ParseOutcome::Valid(line),
            None => ctx.report(Issue::invalid_string("line", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["a", "b", "c"], &[], ctx));
        let a = try_valid!(fields.float("a", ctx));
        let b = try_valid!(fields.float("b", ctx));
        let c = try_valid!(fields.float("c", ctx));
        if a == 0.0 && b == 0.0 {
            return ctx.report(Issue::invalid_string("line", format!("{{{},{},{}}}", a, b, c)));
        }
        ParseOutcome::Valid(Self { a, b, c })
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({ "a": coordinate_json(self.a), "b": coordinate_json(self.b), "c": coordinate_json(self.c) })
    }

    crate::value_glue!(Line);
}

// ============================================================================
// Line segment
// ============================================================================

/// `lseg`, a finite segment written `[(x1,y1),(x2,y2)]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

impl PgType for LineSegment {
    type Config = ();

    fn type_name() -> &'static str {
        "lseg"
    }

    fn type_oid() -> Option<u32> {
        Some(601)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let body = strip_enclosing(trimmed, '[', ']')
            .or_else(|| strip_enclosing(trimmed, '(', ')'))
            .unwrap_or(trimmed);
        match parse_point_list(body).as_deref() {
            Some([start, end]) => ParseOutcome::Valid(Self {
                start: *start,
                end: *end,
            }),
            _ => ctx.report(Issue::invalid_string("lseg", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["start", "end"], &[], ctx));
        let start = try_valid!(point_from_json(fields.get("start"), ctx));
        let end = try_valid!(point_from_json(fields.get("end"), ctx));
        ParseOutcome::Valid(Self { start, end })
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({ "start": self.start.to_json(), "end": self.end.to_json() })
    }

    crate::value_glue!(LineSegment);
}

// ============================================================================
// Box
// ============================================================================

/// `box`, written upper-right corner first: `(x2,y2),(x1,y1)`
///
/// Any two opposite corners are accepted and reordered. Arrays of boxes use
/// `;` as the element delimiter because `,` appears inside every box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PgBox {
    upper_right: Point,
    lower_left: Point,
}

impl PgBox {
    fn from_corners(p: Point, q: Point) -> Self {
        Self {
            upper_right: Point {
                x: p.x.max(q.x),
                y: p.y.max(q.y),
            },
            lower_left: Point {
                x: p.x.min(q.x),
                y: p.y.min(q.y),
            },
        }
    }

    pub fn upper_right(&self) -> Point {
        self.upper_right
    }

    pub fn lower_left(&self) -> Point {
        self.lower_left
    }
}

impl fmt::Display for PgBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.upper_right, self.lower_left)
    }
}

impl PgType for PgBox {
    type Config = ();
    const ARRAY_DELIMITER: char = ';';

    fn type_name() -> &'static str {
        "box"
    }

    fn type_oid() -> Option<u32> {
        Some(603)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let body = strip_enclosing(trimmed, '(', ')').unwrap_or(trimmed);
        match parse_point_list(body).as_deref() {
            Some([p, q]) => ParseOutcome::Valid(Self::from_corners(*p, *q)),
            _ => ctx.report(Issue::invalid_string("box", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["upper_right", "lower_left"], &[], ctx));
        let upper_right = try_valid!(point_from_json(fields.get("upper_right"), ctx));
        let lower_left = try_valid!(point_from_json(fields.get("lower_left"), ctx));
        ParseOutcome::Valid(Self::from_corners(upper_right, lower_left))
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({
            "upper_right": self.upper_right.to_json(),
            "lower_left": self.lower_left.to_json(),
        })
    }

    crate::value_glue!(Box);
}

// ============================================================================
// Circle
// ============================================================================

/// `circle`, written `<(x,y),r>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    fn checked(center: Point, radius: f64, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        if radius < 0.0 {
            return ctx.report(Issue::number_too_small("0", true));
        }
        ParseOutcome::Valid(Self { center, radius })
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.center, format_float8(self.radius))
    }
}

impl PgType for Circle {
    type Config = ();

    fn type_name() -> &'static str {
        "circle"
    }

    fn type_oid() -> Option<u32> {
        Some(718)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let body = strip_enclosing(trimmed, '<', '>')
            .or_else(|| strip_enclosing(trimmed, '(', ')'))
            .unwrap_or(trimmed);
        let parsed = take_point(body).and_then(|(center, rest)| {
            let rest = rest.trim_start().strip_prefix(',')?;
            let radius = parse_coordinate(rest)?;
            Some((center, radius))
        });
        match parsed {
            Some((center, radius)) => Self::checked(center, radius, ctx),
            None => ctx.report(Issue::invalid_string("circle", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["center", "radius"], &[], ctx));
        let center = try_valid!(point_from_json(fields.get("center"), ctx));
        let radius = try_valid!(fields.float("radius", ctx));
        Self::checked(center, radius, ctx)
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({ "center": self.center.to_json(), "radius": coordinate_json(self.radius) })
    }

    crate::value_glue!(Circle);
}

// ============================================================================
// Path and polygon
// ============================================================================

/// `path`, open `[(..),(..)]` or closed `((..),(..))`
///
/// A path without enclosing brackets is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: SmallVec<[Point; 4]>,
    closed: bool,
}

impl Path {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.closed { ("(", ")") } else { ("[", "]") };
        f.write_str(open)?;
        write_points(f, &self.points)?;
        f.write_str(close)
    }
}

impl PgType for Path {
    type Config = ();

    fn type_name() -> &'static str {
        "path"
    }

    fn type_oid() -> Option<u32> {
        Some(602)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let (body, closed) = match strip_enclosing(trimmed, '[', ']') {
            Some(body) => (body, false),
            None => (strip_enclosing(trimmed, '(', ')').unwrap_or(trimmed), true),
        };
        match parse_point_list(body) {
            Some(points) => ParseOutcome::Valid(Self {
                points: points.into(),
                closed,
            }),
            None => ctx.report(Issue::invalid_string("path", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["points", "closed"], &[], ctx));
        let items = try_valid!(fields.array("points", ctx));
        let closed = try_valid!(fields.boolean("closed", ctx));
        let points = try_valid!(points_from_json(items, ctx));
        if points.is_empty() {
            return ctx.report(Issue::TooSmall {
                kind: pgtext_diagnostics::SizeKind::Array,
                minimum: pgtext_diagnostics::Bound::Count(1),
                inclusive: true,
                exact: false,
            });
        }
        ParseOutcome::Valid(Self {
            points: points.into(),
            closed,
        })
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        let points: Vec<Value> = self.points.iter().map(Point::to_json).collect();
        json!({ "points": points, "closed": self.closed })
    }

    crate::value_glue!(Path);
}

/// `polygon`, written `((x1,y1),...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: SmallVec<[Point; 4]>,
}

impl Polygon {
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_points(f, &self.points)?;
        f.write_str(")")
    }
}

impl PgType for Polygon {
    type Config = ();

    fn type_name() -> &'static str {
        "polygon"
    }

    fn type_oid() -> Option<u32> {
        Some(604)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let body = strip_enclosing(trimmed, '(', ')').unwrap_or(trimmed);
        match parse_point_list(body) {
            Some(points) => ParseOutcome::Valid(Self {
                points: points.into(),
            }),
            None => ctx.report(Issue::invalid_string("polygon", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["points"], &[], ctx));
        let items = try_valid!(fields.array("points", ctx));
        let points = try_valid!(points_from_json(items, ctx));
        if points.is_empty() {
            return ctx.report(Issue::TooSmall {
                kind: pgtext_diagnostics::SizeKind::Array,
                minimum: pgtext_diagnostics::Bound::Count(1),
                inclusive: true,
                exact: false,
            });
        }
        ParseOutcome::Valid(Self {
            points: points.into(),
        })
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        let points: Vec<Value> = self.points.iter().map(Point::to_json).collect();
        json!({ "points": points })
    }

    crate::value_glue!(Polygon);
}
