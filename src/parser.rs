//! Labeled address components returned by a parsing worker.
//!
//! Workers answer with libpostal's label/value pairs. [`ParsedAddress`]
//! collects them by label and [`ParsedAddress::to_address`] folds them into
//! the six-field [`Address`] the scorer compares.

use crate::types::Address;
use serde::{Deserialize, Serialize};

/// One labeled span of the input, e.g. `{"label": "road", "value": "main st"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// libpostal label such as `house_number`, `road` or `city`
    pub label: String,
    /// Text the label covers
    pub value: String,
}

impl AddressComponent {
    /// Create a component.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Structured representation of a parsed address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedAddress {
    /// House number (e.g., "123", "123A")
    pub house_number: Option<String>,
    /// Road/street name (e.g., "Main St", "Broadway")
    pub road: Option<String>,
    /// Unit/apartment number (e.g., "Apt 2B", "Unit 5")
    pub unit: Option<String>,
    /// Floor/level (e.g., "2nd Floor", "Floor 3")
    pub level: Option<String>,
    /// Staircase
    pub staircase: Option<String>,
    /// Entrance
    pub entrance: Option<String>,
    /// Post office box
    pub po_box: Option<String>,
    /// Building or venue name
    pub house: Option<String>,
    /// Postcode (e.g., "10001", "SW1A 1AA")
    pub postcode: Option<String>,
    /// Suburb/neighborhood
    pub suburb: Option<String>,
    /// City/locality (e.g., "New York", "London")
    pub city: Option<String>,
    /// City district
    pub city_district: Option<String>,
    /// State/province (e.g., "NY", "California", "Ontario")
    pub state: Option<String>,
    /// State district
    pub state_district: Option<String>,
    /// Country (e.g., "USA", "United States")
    pub country: Option<String>,
    /// All other components, labels kept
    pub other: Vec<AddressComponent>,
}

fn append(slot: &mut Option<String>, value: String) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(&value);
        }
        None => *slot = Some(value),
    }
}

fn join(parts: &[&Option<String>]) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

impl ParsedAddress {
    /// Collect worker components by label. A label seen twice has its values
    /// joined with a space.
    pub fn from_components(components: Vec<AddressComponent>) -> Self {
        let mut parsed = ParsedAddress::default();

        for component in components {
            let slot = match component.label.as_str() {
                "house_number" => &mut parsed.house_number,
                "road" => &mut parsed.road,
                "unit" => &mut parsed.unit,
                "level" => &mut parsed.level,
                "staircase" => &mut parsed.staircase,
                "entrance" => &mut parsed.entrance,
                "po_box" => &mut parsed.po_box,
                "house" => &mut parsed.house,
                "postcode" => &mut parsed.postcode,
                "suburb" => &mut parsed.suburb,
                "city" => &mut parsed.city,
                "city_district" => &mut parsed.city_district,
                "state" => &mut parsed.state,
                "state_district" => &mut parsed.state_district,
                "country" => &mut parsed.country,
                _ => {
                    parsed.other.push(component);
                    continue;
                }
            };
            append(slot, component.value);
        }

        parsed
    }

    /// Fold the components into a six-field [`Address`].
    ///
    /// * line1: house number and road, else the PO box, else the building name
    /// * line2: unit, level, staircase and entrance (plus the PO box when
    ///   line1 came from the road)
    /// * city: city, else suburb, else city district
    /// * state: state, else state district
    pub fn to_address(&self) -> Address {
        let street = join(&[&self.house_number, &self.road]);
        let (line1, po_box_in_line2) = match street {
            Some(street) => (Some(street), true),
            None => (join(&[&self.po_box]).or_else(|| join(&[&self.house])), false),
        };

        let line2 = if po_box_in_line2 {
            join(&[
                &self.unit,
                &self.level,
                &self.staircase,
                &self.entrance,
                &self.po_box,
            ])
        } else {
            join(&[&self.unit, &self.level, &self.staircase, &self.entrance])
        };

        Address {
            line1,
            line2,
            city: join(&[&self.city])
                .or_else(|| join(&[&self.suburb]))
                .or_else(|| join(&[&self.city_district])),
            state: join(&[&self.state]).or_else(|| join(&[&self.state_district])),
            postal_code: join(&[&self.postcode]),
            country: join(&[&self.country]),
        }
    }
}

impl From<ParsedAddress> for Address {
    fn from(parsed: ParsedAddress) -> Self {
        parsed.to_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pairs: &[(&str, &str)]) -> ParsedAddress {
        ParsedAddress::from_components(
            pairs
                .iter()
                .map(|(label, value)| AddressComponent::new(*label, *value))
                .collect(),
        )
    }

    #[test]
    fn test_no_components_yield_empty_address() {
        let address = ParsedAddress::from_components(Vec::new()).to_address();
        assert!(address.is_empty());
        assert_eq!(address, Address::new());
    }

    #[test]
    fn test_street_address() {
        let parsed = parse(&[
            ("house_number", "123"),
            ("road", "main st"),
            ("unit", "apt 4b"),
            ("city", "new york"),
            ("state", "ny"),
            ("postcode", "10001"),
            ("country", "usa"),
        ]);

        let address = parsed.to_address();
        assert_eq!(address.line1(), Some("123 main st"));
        assert_eq!(address.line2(), Some("apt 4b"));
        assert_eq!(address.city(), Some("new york"));
        assert_eq!(address.state(), Some("ny"));
        assert_eq!(address.postal_code(), Some("10001"));
        assert_eq!(address.country(), Some("usa"));
    }

    #[test]
    fn test_fallbacks() {
        let parsed = parse(&[
            ("po_box", "po box 42"),
            ("suburb", "brooklyn"),
            ("state_district", "kings county"),
        ]);

        let address: Address = parsed.into();
        assert_eq!(address.line1(), Some("po box 42"));
        assert_eq!(address.line2(), None);
        assert_eq!(address.city(), Some("brooklyn"));
        assert_eq!(address.state(), Some("kings county"));
    }

    #[test]
    fn test_repeated_labels_and_unknown_labels() {
        let parsed = parse(&[
            ("road", "avenue"),
            ("road", "des champs elysees"),
            ("world_region", "europe"),
        ]);

        assert_eq!(parsed.road.as_deref(), Some("avenue des champs elysees"));
        assert_eq!(parsed.other, vec![AddressComponent::new("world_region", "europe")]);
        assert_eq!(
            parsed.to_address().line1(),
            Some("avenue des champs elysees")
        );
    }

    #[test]
    fn test_decode_worker_response() {
        let body = r#"[{"label":"house_number","value":"1600"},{"label":"road","value":"pennsylvania ave nw"}]"#;
        let components: Vec<AddressComponent> = serde_json::from_str(body).unwrap();
        let address = ParsedAddress::from_components(components).to_address();
        assert_eq!(address.line1(), Some("1600 pennsylvania ave nw"));
    }
}
