/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::Value;

use super::{record_time, related, str_prop, Context};
use crate::{
    entity::EntityKind,
    frame::{Field, Frame},
};

const PHENOMENON_TIME: &str = "phenomenonTime";

/// Time and result columns of the observations that have a phenomenon
/// time.
pub(super) fn time_series<'a, I>(observations: I) -> (Vec<Value>, Vec<Value>)
where
    I: IntoIterator<Item = &'a Value>,
{
    observations
        .into_iter()
        .filter_map(|obs| {
            let time = record_time(obs, PHENOMENON_TIME)?;
            Some((
                Value::from(time),
                obs.get("result").cloned().unwrap_or(Value::Null),
            ))
        })
        .unzip()
}

pub(super) fn observations(cx: &Context) -> Frame {
    let (times, values) = time_series(cx.records);
    Frame::new(cx.query.frame_name(EntityKind::Observations.plural()))
        .with_field(Field::time("time").with_values(times))
        .with_field(Field::number("value").with_values(values))
}

/// Observations of a single feature of interest.
pub(super) fn feature_series(cx: &Context) -> Frame {
    let feature = cx.records.first();
    let name = feature
        .and_then(|f| str_prop(f, "name"))
        .unwrap_or("Feature of Interest");
    let (times, values) = time_series(feature.into_iter().flat_map(|f| {
        related(f, EntityKind::FeaturesOfInterest, EntityKind::Observations)
    }));

    Frame::new(cx.query.frame_name(name))
        .with_field(Field::time("time").with_values(times))
        .with_field(
            Field::number("value")
                .with_display_name(name)
                .with_values(values),
        )
}
