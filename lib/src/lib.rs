/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

pub mod crs;
pub mod entity;
pub mod filter;
pub mod frame;
pub mod options;
pub mod query;
pub mod response;
pub mod template;
pub mod transform;

pub(crate) mod error;
#[cfg(feature = "schemars")]
mod schema;

pub use crs::Crs;
pub use entity::{Cardinality, EntityKind, Relation};
pub use error::{Error, Result};
pub use filter::{
    ComplexFilter, Comparison, Coordinates, EntityFilter, FilterCondition, FilterValue, Geometry,
    GeometryKind, Operator, Ring, SpatialFilter, SpatialOperator, TemporalFilter, VariableFilter,
};
pub use frame::{Field, FieldConfig, FieldType, Frame, Meta, Notice, Severity};
pub use query::{
    build_url, scan_expanded, Direction, Encoding, ExpandDirective, FromTo, OrderBy, Query,
    ResultFormat, SubQuery,
};
pub use response::PagedResult;
pub use template::{apply_template_variables, ScopedVars, TemplateSrv, Variables};
pub use transform::{raw_frame, transform, Layout};
