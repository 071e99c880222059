/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::{borrow::Cow, fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{Error, Result};

/// The entity sets exposed by a SensorThings API service.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub enum EntityKind {
    Things,
    Locations,
    HistoricalLocations,
    Datastreams,
    Sensors,
    ObservedProperties,
    Observations,
    FeaturesOfInterest,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Cardinality {
    One,
    Many,
}

/// A navigation property from one entity set to another.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Relation {
    pub target: EntityKind,
    pub cardinality: Cardinality,
}

const THING_RELATIONS: &[Relation] = &[
    Relation::many(EntityKind::Locations),
    Relation::many(EntityKind::HistoricalLocations),
    Relation::many(EntityKind::Datastreams),
];
const LOCATION_RELATIONS: &[Relation] = &[
    Relation::many(EntityKind::Things),
    Relation::many(EntityKind::HistoricalLocations),
];
const HISTORICAL_LOCATION_RELATIONS: &[Relation] = &[
    Relation::one(EntityKind::Things),
    Relation::many(EntityKind::Locations),
];
const DATASTREAM_RELATIONS: &[Relation] = &[
    Relation::one(EntityKind::Things),
    Relation::one(EntityKind::Sensors),
    Relation::one(EntityKind::ObservedProperties),
    Relation::many(EntityKind::Observations),
];
const DATASTREAMS_RELATION: &[Relation] = &[Relation::many(EntityKind::Datastreams)];
const OBSERVATION_RELATIONS: &[Relation] = &[
    Relation::one(EntityKind::Datastreams),
    Relation::one(EntityKind::FeaturesOfInterest),
];
const FEATURE_RELATIONS: &[Relation] = &[Relation::many(EntityKind::Observations)];

impl Relation {
    const fn one(target: EntityKind) -> Self {
        Self {
            target,
            cardinality: Cardinality::One,
        }
    }

    const fn many(target: EntityKind) -> Self {
        Self {
            target,
            cardinality: Cardinality::Many,
        }
    }

    /// The navigation property name as exposed on the parent entity.
    pub fn name(&self) -> &'static str {
        match self.cardinality {
            Cardinality::One => self.target.singular(),
            Cardinality::Many => self.target.plural(),
        }
    }
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Things,
        EntityKind::Locations,
        EntityKind::Sensors,
        EntityKind::ObservedProperties,
        EntityKind::Datastreams,
        EntityKind::Observations,
        EntityKind::FeaturesOfInterest,
        EntityKind::HistoricalLocations,
    ];

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Things => "Things",
            EntityKind::Locations => "Locations",
            EntityKind::HistoricalLocations => "HistoricalLocations",
            EntityKind::Datastreams => "Datastreams",
            EntityKind::Sensors => "Sensors",
            EntityKind::ObservedProperties => "ObservedProperties",
            EntityKind::Observations => "Observations",
            EntityKind::FeaturesOfInterest => "FeaturesOfInterest",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            EntityKind::Things => "Thing",
            EntityKind::Locations => "Location",
            EntityKind::HistoricalLocations => "HistoricalLocation",
            EntityKind::Datastreams => "Datastream",
            EntityKind::Sensors => "Sensor",
            EntityKind::ObservedProperties => "ObservedProperty",
            EntityKind::Observations => "Observation",
            EntityKind::FeaturesOfInterest => "FeatureOfInterest",
        }
    }

    /// Singular name with a lowercase first letter, used as column prefix.
    pub fn column_prefix(self) -> &'static str {
        match self {
            EntityKind::Things => "thing",
            EntityKind::Locations => "location",
            EntityKind::HistoricalLocations => "historicalLocation",
            EntityKind::Datastreams => "datastream",
            EntityKind::Sensors => "sensor",
            EntityKind::ObservedProperties => "observedProperty",
            EntityKind::Observations => "observation",
            EntityKind::FeaturesOfInterest => "featureOfInterest",
        }
    }

    pub fn relations(self) -> &'static [Relation] {
        match self {
            EntityKind::Things => THING_RELATIONS,
            EntityKind::Locations => LOCATION_RELATIONS,
            EntityKind::HistoricalLocations => HISTORICAL_LOCATION_RELATIONS,
            EntityKind::Datastreams => DATASTREAM_RELATIONS,
            EntityKind::Sensors | EntityKind::ObservedProperties => DATASTREAMS_RELATION,
            EntityKind::Observations => OBSERVATION_RELATIONS,
            EntityKind::FeaturesOfInterest => FEATURE_RELATIONS,
        }
    }

    pub fn relation(self, target: EntityKind) -> Option<&'static Relation> {
        self.relations().iter().find(|rel| rel.target == target)
    }

    /// Name under which `target` is expanded on this entity. Unknown
    /// relations fall back to the plural name.
    pub fn navigation_name(self, target: EntityKind) -> &'static str {
        self.relation(target)
            .map_or_else(|| target.plural(), |rel| rel.name())
    }

    /// Compare two entity names through their singular forms.
    pub fn matches_name(self, name: &str) -> bool {
        singular_name(name) == self.singular()
    }
}

/// Strip the plural suffix of an entity set name. Names that are already
/// singular are returned unchanged.
pub fn singular_name(name: &str) -> Cow<'_, str> {
    match name {
        "ObservedProperties" => Cow::Borrowed("ObservedProperty"),
        "FeaturesOfInterest" => Cow::Borrowed("FeatureOfInterest"),
        "ObservedProperty" | "FeatureOfInterest" => Cow::Borrowed(name),
        _ => Cow::Borrowed(name.strip_suffix('s').unwrap_or(name)),
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.plural())
    }
}

impl FromStr for EntityKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let singular = singular_name(s);
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.plural() == s || kind.singular() == singular)
            .ok_or_else(|| Error::UnknownEntity(s.to_string()))
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for EntityKind {
    fn schema_name() -> String {
        "EntityKind".to_string()
    }

    fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        crate::schema::string_enum(EntityKind::ALL.iter().map(|kind| kind.plural()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_names() {
        assert_eq!(singular_name("Things"), "Thing");
        assert_eq!(singular_name("ObservedProperties"), "ObservedProperty");
        assert_eq!(singular_name("FeaturesOfInterest"), "FeatureOfInterest");
        assert_eq!(singular_name("Thing"), "Thing");
    }

    #[test]
    fn parse_plural_and_singular() {
        assert_eq!("Datastreams".parse::<EntityKind>().unwrap(), EntityKind::Datastreams);
        assert_eq!("Datastream".parse::<EntityKind>().unwrap(), EntityKind::Datastreams);
        assert_eq!(
            "ObservedProperty".parse::<EntityKind>().unwrap(),
            EntityKind::ObservedProperties
        );
        assert!("Widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn navigation_names() {
        use EntityKind::*;
        assert_eq!(Datastreams.navigation_name(Things), "Thing");
        assert_eq!(Datastreams.navigation_name(Observations), "Observations");
        assert_eq!(Observations.navigation_name(FeaturesOfInterest), "FeatureOfInterest");
        assert_eq!(Things.navigation_name(Sensors), "Sensors");
    }

    #[test]
    fn relations_are_symmetric() {
        for kind in EntityKind::ALL {
            assert!(!kind.relations().is_empty(), "{kind} has no relations");
            for rel in kind.relations() {
                assert!(
                    rel.target.relation(kind).is_some(),
                    "{} does not lead back to {kind}",
                    rel.target
                );
            }
        }
        assert_eq!(
            EntityKind::Sensors.relations(),
            EntityKind::ObservedProperties.relations()
        );
    }
}
