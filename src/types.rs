//! Common types shared by the worker pool and the scorer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six fields of a structured address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    /// Primary street line (house number and road)
    Line1,
    /// Secondary line (unit, floor, suite)
    Line2,
    /// City or locality
    City,
    /// State, province or region
    State,
    /// Postal code
    PostalCode,
    /// Country name or code
    Country,
}

impl AddressField {
    /// All fields in comparison order.
    pub const ALL: [AddressField; 6] = [
        AddressField::Line1,
        AddressField::Line2,
        AddressField::City,
        AddressField::State,
        AddressField::PostalCode,
        AddressField::Country,
    ];

    /// Stable snake_case name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressField::Line1 => "line1",
            AddressField::Line2 => "line2",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::PostalCode => "postal_code",
            AddressField::Country => "country",
        }
    }

    /// Parse a field name, accepting a few common spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "line1" | "line_1" | "address1" => Some(AddressField::Line1),
            "line2" | "line_2" | "address2" => Some(AddressField::Line2),
            "city" => Some(AddressField::City),
            "state" | "province" => Some(AddressField::State),
            "postal_code" | "postalcode" | "postcode" | "zip" => Some(AddressField::PostalCode),
            "country" => Some(AddressField::Country),
            _ => None,
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured postal address.
///
/// Every field is optional. A missing, empty or whitespace-only value is
/// *absent*: the accessors return `None` for it and the scorer leaves the
/// field out instead of counting it as a mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Primary street line, e.g. "123 Main St"
    pub line1: Option<String>,
    /// Secondary line, e.g. "Apt 4B"
    pub line2: Option<String>,
    /// City, e.g. "New York"
    pub city: Option<String>,
    /// State or province, e.g. "NY"
    pub state: Option<String>,
    /// Postal code, e.g. "10001"
    pub postal_code: Option<String>,
    /// Country name or code, e.g. "US"
    pub country: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Address {
    /// Create an empty address.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary street line.
    pub fn with_line1(mut self, value: impl Into<String>) -> Self {
        self.line1 = Some(value.into());
        self
    }

    /// Set the secondary line.
    pub fn with_line2(mut self, value: impl Into<String>) -> Self {
        self.line2 = Some(value.into());
        self
    }

    /// Set the city.
    pub fn with_city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    /// Set the state.
    pub fn with_state(mut self, value: impl Into<String>) -> Self {
        self.state = Some(value.into());
        self
    }

    /// Set the postal code.
    pub fn with_postal_code(mut self, value: impl Into<String>) -> Self {
        self.postal_code = Some(value.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    /// Trimmed primary street line, `None` when absent.
    pub fn line1(&self) -> Option<&str> {
        present(&self.line1)
    }

    /// Trimmed secondary line, `None` when absent.
    pub fn line2(&self) -> Option<&str> {
        present(&self.line2)
    }

    /// Trimmed city, `None` when absent.
    pub fn city(&self) -> Option<&str> {
        present(&self.city)
    }

    /// Trimmed state, `None` when absent.
    pub fn state(&self) -> Option<&str> {
        present(&self.state)
    }

    /// Trimmed postal code, `None` when absent.
    pub fn postal_code(&self) -> Option<&str> {
        present(&self.postal_code)
    }

    /// Trimmed country, `None` when absent.
    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }

    /// Trimmed value of `field`, `None` when absent.
    pub fn get(&self, field: AddressField) -> Option<&str> {
        match field {
            AddressField::Line1 => self.line1(),
            AddressField::Line2 => self.line2(),
            AddressField::City => self.city(),
            AddressField::State => self.state(),
            AddressField::PostalCode => self.postal_code(),
            AddressField::Country => self.country(),
        }
    }

    /// Number of present fields.
    pub fn populated(&self) -> usize {
        AddressField::ALL
            .iter()
            .filter(|field| self.get(**field).is_some())
            .count()
    }

    /// Check if no field is present.
    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_absent() {
        let address = Address::new()
            .with_line1("  123 Main St ")
            .with_city("   ")
            .with_state("");

        assert_eq!(address.line1(), Some("123 Main St"));
        assert_eq!(address.city(), None);
        assert_eq!(address.state(), None);
        assert_eq!(address.populated(), 1);
        assert!(!address.is_empty());
        assert!(Address::default().is_empty());
    }

    #[test]
    fn test_field_names() {
        for field in AddressField::ALL {
            assert_eq!(AddressField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(AddressField::from_name("ZIP"), Some(AddressField::PostalCode));
        assert_eq!(AddressField::from_name("street"), None);
        assert_eq!(AddressField::PostalCode.to_string(), "postal_code");
    }
}
