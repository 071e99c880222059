/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::{fmt::Display, str::FromStr};

use proj4rs::{transform::transform, Proj};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{Error, Result};

/// Coordinate reference system of the geometries returned by the server.
#[derive(SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum Crs {
    /// Swiss CH1903+ / LV95 (EPSG:2056).
    #[default]
    Lv95,
    /// WGS84 geographic coordinates (EPSG:4326), passed through unchanged.
    Wgs84,
}

/// CH1903+ / LV95 as defined for proj4.
const LV95: &str = "+proj=somerc +lat_0=46.95240555555556 +lon_0=7.439583333333333 \
                    +k=1 +x_0=2600000 +y_0=1200000 +ellps=bessel +units=m +no_defs";
const WGS84: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Source and target projections of a conversion; `None` for passthrough.
struct Projector(Option<(Proj, Proj)>);

impl Crs {
    /// Convert an (easting, northing) pair to WGS84 (longitude, latitude).
    pub fn to_wgs84(self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.projector()?.apply(x, y)
    }

    /// Reproject a GeoJSON geometry object. Only Point, LineString and
    /// Polygon geometries are supported.
    pub fn reproject(self, geometry: &Value) -> Result<Value> {
        let kind = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or(Error::InvalidGeometry("missing geometry type"))?;
        let coords = geometry
            .get("coordinates")
            .ok_or(Error::InvalidGeometry("missing coordinates"))?;

        let projector = self.projector()?;
        let coordinates = match kind {
            "Point" => projector.position(coords)?,
            "LineString" => projector.positions(coords)?,
            "Polygon" => Value::Array(
                coords
                    .as_array()
                    .ok_or(Error::InvalidGeometry("polygon rings must be an array"))?
                    .iter()
                    .map(|ring| projector.positions(ring))
                    .collect::<Result<_>>()?,
            ),
            _ => return Err(Error::UnsupportedGeometry(kind.to_string())),
        };

        Ok(serde_json::json!({
            "type": kind,
            "coordinates": coordinates,
        }))
    }

    fn projector(self) -> Result<Projector> {
        match self {
            Crs::Lv95 => Ok(Projector(Some((
                Proj::from_proj_string(LV95)?,
                Proj::from_proj_string(WGS84)?,
            )))),
            Crs::Wgs84 => Ok(Projector(None)),
        }
    }
}

impl Projector {
    fn apply(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match &self.0 {
            None => Ok((x, y)),
            Some((src, dst)) => {
                let mut point = (x, y, 0.0);
                transform(src, dst, &mut point)?;
                // Geographic output is in radians.
                Ok((point.0.to_degrees(), point.1.to_degrees()))
            }
        }
    }

    fn positions(&self, coords: &Value) -> Result<Value> {
        Ok(Value::Array(
            coords
                .as_array()
                .ok_or(Error::InvalidGeometry("coordinates must be an array"))?
                .iter()
                .map(|pos| self.position(pos))
                .collect::<Result<_>>()?,
        ))
    }

    fn position(&self, pos: &Value) -> Result<Value> {
        match pos.as_array().map(|p| p.as_slice()) {
            Some([x, y, ..]) => {
                let x = x.as_f64().ok_or(Error::InvalidGeometry("non-numeric coordinate"))?;
                let y = y.as_f64().ok_or(Error::InvalidGeometry("non-numeric coordinate"))?;
                let (lon, lat) = self.apply(x, y)?;
                Ok(serde_json::json!([lon, lat]))
            }
            _ => Err(Error::InvalidGeometry("position needs two coordinates")),
        }
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Lv95 => write!(f, "EPSG:2056"),
            Crs::Wgs84 => write!(f, "EPSG:4326"),
        }
    }
}

impl FromStr for Crs {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EPSG:2056" => Ok(Crs::Lv95),
            "EPSG:4326" | "WGS84" => Ok(Crs::Wgs84),
            _ => Err(Error::UnknownCrs(s.to_string())),
        }
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for Crs {
    fn schema_name() -> String {
        "Crs".to_string()
    }

    fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        crate::schema::string_enum(["EPSG:2056", "EPSG:4326"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_origin() {
        let (lon, lat) = Crs::Lv95.to_wgs84(2_600_000.0, 1_200_000.0).unwrap();
        assert!((lon - 7.439583333).abs() < 1e-6, "{lon}");
        assert!((lat - 46.952405556).abs() < 1e-6, "{lat}");
    }

    #[test]
    fn zurich_lies_north_east_of_bern() {
        let (lon, lat) = Crs::Lv95.to_wgs84(2_683_000.0, 1_248_000.0).unwrap();
        assert!((8.5..8.6).contains(&lon), "{lon}");
        assert!((47.35..47.4).contains(&lat), "{lat}");
    }

    #[test]
    fn reproject_polygon() {
        let geom = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[2600000.0, 1200000.0], [2601000.0, 1200000.0],
                             [2601000.0, 1201000.0], [2600000.0, 1200000.0]]]
        });
        let out = Crs::Lv95.reproject(&geom).unwrap();
        let ring = out["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 4);
        assert!(ring[1][0].as_f64().unwrap() > ring[0][0].as_f64().unwrap());
    }

    #[test]
    fn unsupported_geometry() {
        let geom = serde_json::json!({"type": "MultiPoint", "coordinates": []});
        assert!(matches!(
            Crs::Lv95.reproject(&geom),
            Err(Error::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn wgs84_passthrough() {
        assert_eq!(Crs::Wgs84.to_wgs84(7.5, 46.9).unwrap(), (7.5, 46.9));
    }
}
