/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use itertools::Itertools;

use super::{Coordinates, GeometryKind, Ring, SpatialFilter};
use crate::{Error, Result};

type Position = [f64; 2];

/// A validated filter geometry. Polygon rings are always closed.
#[derive(Clone, PartialEq, Debug)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Self::Point([x, y])
    }

    pub fn line_string<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Result<Self> {
        let points = points.into_iter().map(|(x, y)| [x, y]).collect::<Vec<_>>();
        if points.len() < 2 {
            return Err(Error::InvalidGeometry("line string needs at least two points"));
        }
        Ok(Self::LineString(points))
    }

    /// Build a polygon, closing any open ring.
    pub fn polygon<R, I>(rings: R) -> Result<Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (f64, f64)>,
    {
        let rings = rings
            .into_iter()
            .map(|ring| close_ring(ring.into_iter().map(|(x, y)| [x, y]).collect()))
            .collect::<Result<Vec<_>>>()?;
        if rings.is_empty() {
            return Err(Error::InvalidGeometry("polygon needs at least one ring"));
        }
        Ok(Self::Polygon(rings))
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Geography literal as understood by the `st_*` filter functions.
    pub fn to_wkt(&self) -> String {
        let body = match self {
            Geometry::Point(p) => format!("POINT ({})", position(p)),
            Geometry::LineString(ps) => format!("LINESTRING ({})", positions(ps)),
            Geometry::Polygon(rings) => format!(
                "POLYGON ({})",
                rings.iter().map(|ring| format!("({})", positions(ring))).join(", ")
            ),
        };
        format!("geography'{body}'")
    }

    pub(super) fn to_parts(&self) -> (GeometryKind, Option<Coordinates>, Vec<Ring>) {
        match self {
            Geometry::Point(p) => (
                GeometryKind::Point,
                Some(Coordinates::Position(p.to_vec())),
                Vec::new(),
            ),
            Geometry::LineString(ps) => (
                GeometryKind::LineString,
                Some(Coordinates::Positions(ps.iter().map(|p| p.to_vec()).collect())),
                Vec::new(),
            ),
            Geometry::Polygon(rings) => (
                GeometryKind::Polygon,
                None,
                rings
                    .iter()
                    .map(|ring| Ring {
                        coordinates: ring.iter().map(|p| p.to_vec()).collect(),
                    })
                    .collect(),
            ),
        }
    }
}

impl SpatialFilter {
    /// Validate the geometry payload of this filter. Returns `Ok(None)`
    /// when no geometry kind was chosen yet.
    pub fn geometry(&self) -> Result<Option<Geometry>> {
        let Some(kind) = self.geometry_type else {
            return Ok(None);
        };
        match kind {
            GeometryKind::Point => match &self.coordinates {
                Some(Coordinates::Position(p)) if p.len() >= 2 => {
                    Ok(Some(Geometry::point(p[0], p[1])))
                }
                _ => Err(Error::InvalidGeometry("point needs two coordinates")),
            },
            GeometryKind::LineString => match &self.coordinates {
                Some(Coordinates::Positions(ps)) => {
                    Geometry::line_string(to_positions(ps)?.into_iter().map(|[x, y]| (x, y)))
                        .map(Some)
                }
                _ => Err(Error::InvalidGeometry("line string needs at least two points")),
            },
            GeometryKind::Polygon => {
                let rings = self
                    .rings
                    .iter()
                    .map(|ring| to_positions(&ring.coordinates))
                    .collect::<Result<Vec<_>>>()?;
                Geometry::polygon(
                    rings
                        .into_iter()
                        .map(|ring| ring.into_iter().map(|[x, y]| (x, y))),
                )
                .map(Some)
            }
        }
    }
}

fn to_positions(points: &[Vec<f64>]) -> Result<Vec<Position>> {
    points
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(Error::InvalidGeometry("position needs two coordinates")),
        })
        .collect()
}

fn close_ring(mut ring: Vec<Position>) -> Result<Vec<Position>> {
    if ring.len() < 3 {
        return Err(Error::InvalidGeometry("polygon ring needs at least three points"));
    }
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }
    if ring.len() < 4 {
        return Err(Error::InvalidGeometry("polygon ring needs at least four points"));
    }
    Ok(ring)
}

fn position(p: &Position) -> String {
    format!("{} {}", p[0], p[1])
}

fn positions(ps: &[Position]) -> String {
    ps.iter().map(position).join(", ")
}
