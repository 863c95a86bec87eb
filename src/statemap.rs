//! Data behind the visited-states map. The map itself is drawn in the
//! browser from a public boundary dataset keyed by FIPS code; this module
//! owns everything that isn't geometry: FIPS to postal-code mapping, which
//! states were visited, and the colors each status is painted with. The
//! build writes [`data`] out as `state-map.json`.

use serde::Serialize;

/// FIPS numeric state codes (as they appear in the boundary dataset) and
/// their postal codes.
pub const STATE_CODES: [(&str, &str); 51] = [
    ("01", "AL"),
    ("02", "AK"),
    ("04", "AZ"),
    ("05", "AR"),
    ("06", "CA"),
    ("08", "CO"),
    ("09", "CT"),
    ("10", "DE"),
    ("11", "DC"),
    ("12", "FL"),
    ("13", "GA"),
    ("15", "HI"),
    ("16", "ID"),
    ("17", "IL"),
    ("18", "IN"),
    ("19", "IA"),
    ("20", "KS"),
    ("21", "KY"),
    ("22", "LA"),
    ("23", "ME"),
    ("24", "MD"),
    ("25", "MA"),
    ("26", "MI"),
    ("27", "MN"),
    ("28", "MS"),
    ("29", "MO"),
    ("30", "MT"),
    ("31", "NE"),
    ("32", "NV"),
    ("33", "NH"),
    ("34", "NJ"),
    ("35", "NM"),
    ("36", "NY"),
    ("37", "NC"),
    ("38", "ND"),
    ("39", "OH"),
    ("40", "OK"),
    ("41", "OR"),
    ("42", "PA"),
    ("44", "RI"),
    ("45", "SC"),
    ("46", "SD"),
    ("47", "TN"),
    ("48", "TX"),
    ("49", "UT"),
    ("50", "VT"),
    ("51", "VA"),
    ("53", "WA"),
    ("54", "WV"),
    ("55", "WI"),
    ("56", "WY"),
];

/// States stayed overnight in.
pub const VISITED: [&str; 19] = [
    "AL", "CA", "CO", "FL", "GA", "IA", "ID", "KY", "MO", "MN", "MT", "NE", "NV", "OR", "TN", "SC",
    "SD", "WA", "WY",
];

/// States driven through without an overnight stay.
pub const DRIVEN_THROUGH: [&str; 4] = ["IL", "KS", "ND", "UT"];

/// The outline color between states.
pub const STROKE: &str = "#fff";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateStatus {
    Visited,
    DrivenThrough,
    Unvisited,
}

/// The fill colors for one [`StateStatus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub normal: &'static str,
    pub hover: &'static str,
}

impl StateStatus {
    pub fn colors(self) -> ColorPair {
        match self {
            StateStatus::Visited => ColorPair {
                normal: "#34D399",
                hover: "#10B981",
            },
            StateStatus::DrivenThrough => ColorPair {
                normal: "#60A5FA",
                hover: "#3B82F6",
            },
            StateStatus::Unvisited => ColorPair {
                normal: "#e5e7eb",
                hover: "#d1d5db",
            },
        }
    }

    /// The legend text for the status.
    pub fn label(self) -> &'static str {
        match self {
            StateStatus::Visited => "States we've stayed in",
            StateStatus::DrivenThrough => "Driven through",
            StateStatus::Unvisited => "Not yet visited",
        }
    }
}

/// Maps a FIPS code to its postal code.
pub fn postal_code(fips: &str) -> Option<&'static str> {
    STATE_CODES
        .iter()
        .find(|(f, _)| *f == fips)
        .map(|(_, code)| *code)
}

/// Classifies a postal code. A visited state is never also reported as
/// driven through; unknown codes are unvisited.
pub fn status(code: &str) -> StateStatus {
    if VISITED.contains(&code) {
        StateStatus::Visited
    } else if DRIVEN_THROUGH.contains(&code) {
        StateStatus::DrivenThrough
    } else {
        StateStatus::Unvisited
    }
}

pub fn fill(code: &str, hovered: bool) -> &'static str {
    let colors = status(code).colors();
    if hovered {
        colors.hover
    } else {
        colors.normal
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateEntry {
    pub fips: &'static str,
    pub code: &'static str,
    pub status: StateStatus,
    pub fill: &'static str,
    pub hover_fill: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub status: StateStatus,
    pub label: &'static str,
    pub color: &'static str,
}

/// Everything the map script needs, serialized as `state-map.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateMapData {
    pub stroke: &'static str,
    pub legend: Vec<LegendEntry>,
    pub states: Vec<StateEntry>,
}

pub fn data() -> StateMapData {
    StateMapData {
        stroke: STROKE,
        legend: [
            StateStatus::Visited,
            StateStatus::DrivenThrough,
            StateStatus::Unvisited,
        ]
        .iter()
        .map(|&status| LegendEntry {
            status,
            label: status.label(),
            color: status.colors().normal,
        })
        .collect(),
        states: STATE_CODES
            .iter()
            .map(|&(fips, code)| {
                let colors = status(code).colors();
                StateEntry {
                    fips,
                    code,
                    status: status(code),
                    fill: colors.normal,
                    hover_fill: colors.hover,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_postal_code() {
        assert_eq!(postal_code("06"), Some("CA"));
        assert_eq!(postal_code("11"), Some("DC"));
        assert_eq!(postal_code("03"), None);
        assert_eq!(postal_code("72"), None);
    }

    #[test]
    fn test_status() {
        assert_eq!(status("CA"), StateStatus::Visited);
        assert_eq!(status("IL"), StateStatus::DrivenThrough);
        assert_eq!(status("NY"), StateStatus::Unvisited);
        assert_eq!(status(""), StateStatus::Unvisited);
    }

    #[test]
    fn test_sets_are_disjoint_and_known() {
        for code in VISITED.iter().chain(DRIVEN_THROUGH.iter()) {
            assert!(
                STATE_CODES.iter().any(|(_, c)| c == code),
                "{} isn't a known state",
                code
            );
        }
        assert!(!VISITED.iter().any(|code| DRIVEN_THROUGH.contains(code)));
    }

    #[test]
    fn test_fill() {
        assert_eq!(fill("CA", false), "#34D399");
        assert_eq!(fill("CA", true), "#10B981");
        assert_eq!(fill("UT", true), "#3B82F6");
        assert_eq!(fill("NY", false), "#e5e7eb");
    }

    #[test]
    fn test_data_serializes() {
        let data = data();
        assert_eq!(data.states.len(), 51);
        assert_eq!(data.legend.len(), 3);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["stroke"], "#fff");
        assert_eq!(json["states"][4]["code"], "CA");
        assert_eq!(json["states"][4]["status"], "visited");
        assert_eq!(json["legend"][1]["status"], "driven_through");
    }
}
