/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::BTreeSet;

use nom::{
    bytes::complete::{tag, take_till, take_until},
    sequence::preceded,
    IResult,
};

use crate::entity::EntityKind;

/// Relations named in the `$expand=` parameter of a free-form query
/// string. This is a plain scan, not a parser: the parameter is split on
/// commas and everything from the first `(` of an item is dropped, so
/// nested options containing commas may yield spurious items (which are
/// ignored unless they name an entity).
pub fn scan_expanded(expr: &str) -> BTreeSet<EntityKind> {
    let Ok((_, param)) = expand_param(expr) else {
        return BTreeSet::new();
    };
    param
        .split(',')
        .filter_map(|item| {
            let name = item.split('(').next().unwrap_or_default().trim();
            name.parse().ok()
        })
        .collect()
}

fn expand_param(input: &str) -> IResult<&str, &str> {
    preceded(
        preceded(take_until("$expand="), tag("$expand=")),
        take_till(|c| c == '&'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_simple() {
        let found = scan_expanded("$filter=name eq 'x'&$expand=Datastreams,Locations&$top=5");
        assert_eq!(
            found,
            BTreeSet::from([EntityKind::Datastreams, EntityKind::Locations])
        );
    }

    #[test]
    fn scan_strips_sub_expand() {
        let found = scan_expanded("?$expand=HistoricalLocations($expand=Locations)");
        assert_eq!(found, BTreeSet::from([EntityKind::HistoricalLocations]));
    }

    #[test]
    fn scan_singular_navigation_names() {
        let found = scan_expanded("$expand=Datastream($select=name,description)");
        assert_eq!(found, BTreeSet::from([EntityKind::Datastreams]));
    }

    #[test]
    fn nested_expand_is_not_scanned() {
        let found = scan_expanded("$expand=Datastreams($expand=Observations($top=5))");
        assert_eq!(found, BTreeSet::from([EntityKind::Datastreams]));
    }

    #[test]
    fn no_expand() {
        assert!(scan_expanded("$top=10").is_empty());
    }
}
