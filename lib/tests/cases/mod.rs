/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use sta_query::{Frame, Query};

#[macro_export]
macro_rules! define_tests {
    ($test:ident, [ $( $(#[$attr:meta])* ( $case:ident, $path:literal ) ),+ ]) => {
		$(
			paste::paste! {
				#[test]
				$(#[$attr])*
				fn [<$test _ $case>]() {
					let case = cases::load($path);
					$test(&case);
				}
			}
		)*
    };
}

/// A fixture directory: a query, an optional server response and the
/// expected outcome.
pub struct Case {
    pub query: Query,
    pub response: Value,
    pub expected: Expected,
}

#[derive(Deserialize, Default, Debug)]
pub struct Expected {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub frames: Vec<ExpectedFrame>,
}

#[derive(Deserialize, Debug)]
pub struct ExpectedFrame {
    pub name: String,
    pub fields: Vec<String>,
    pub rows: usize,
    #[serde(default)]
    pub geospatial: bool,
}

pub fn load(path: &str) -> Case {
    let path = Path::new("../tests/fixtures").join(path);
    let query = Query::load(&path.join("query.json")).unwrap();
    let response = match path.join("response.json") {
        p if p.exists() => serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap(),
        _ => Value::Null,
    };
    let expected = serde_yaml::from_str(
        &std::fs::read_to_string(path.join("expected.yaml")).unwrap(),
    )
    .unwrap();
    Case {
        query,
        response,
        expected,
    }
}

impl ExpectedFrame {
    pub fn check(&self, frame: &Frame) {
        assert_eq!(frame.name, self.name);
        assert_eq!(
            frame.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            self.fields,
            "fields of frame {}",
            self.name
        );
        assert_eq!(frame.len(), self.rows, "rows of frame {}", self.name);
        assert_eq!(frame.is_geospatial(), self.geospatial, "geospatial flag of {}", self.name);
    }
}
