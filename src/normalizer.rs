//! Address field normalization.
//!
//! Canonicalizes street types, directionals and unit designators to their
//! USPS abbreviations so that "123 North Main Street" and "123 N Main St"
//! compare on the same tokens.

use crate::types::Address;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Street-type suffixes and their canonical abbreviations.
const STREET_TYPES: &[(&str, &str)] = &[
    ("street", "st"),
    ("str", "st"),
    ("strt", "st"),
    ("avenue", "ave"),
    ("av", "ave"),
    ("aven", "ave"),
    ("avenu", "ave"),
    ("boulevard", "blvd"),
    ("boul", "blvd"),
    ("road", "rd"),
    ("drive", "dr"),
    ("drv", "dr"),
    ("lane", "ln"),
    ("court", "ct"),
    ("place", "pl"),
    ("square", "sq"),
    ("terrace", "ter"),
    ("parkway", "pkwy"),
    ("pkway", "pkwy"),
    ("highway", "hwy"),
    ("circle", "cir"),
    ("expressway", "expy"),
    ("freeway", "fwy"),
    ("trail", "trl"),
    ("plaza", "plz"),
    ("crescent", "cres"),
    ("center", "ctr"),
    ("centre", "ctr"),
];

/// Compass directionals.
const DIRECTIONALS: &[(&str, &str)] = &[
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
];

/// Secondary unit designators.
const UNIT_DESIGNATORS: &[(&str, &str)] = &[
    ("suite", "ste"),
    ("apartment", "apt"),
    ("floor", "fl"),
    ("building", "bldg"),
    ("room", "rm"),
    ("department", "dept"),
];

fn table(entries: &[&[(&'static str, &'static str)]]) -> HashMap<&'static str, &'static str> {
    entries.iter().flat_map(|t| t.iter().copied()).collect()
}

static STREET_TYPE_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| table(&[STREET_TYPES]));
static DIRECTIONAL_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| table(&[DIRECTIONALS]));
static UNIT_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| table(&[UNIT_DESIGNATORS]));

/// Options controlling which normalization steps run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Lowercase the input
    pub lowercase: bool,
    /// Drop apostrophes instead of splitting on them ("O'Hare" -> "ohare")
    pub delete_apostrophes: bool,
    /// Drop periods instead of splitting on them ("N.W." -> "nw")
    pub delete_periods: bool,
    /// Canonicalize street-type suffixes
    pub street_types: bool,
    /// Canonicalize compass directionals
    pub directionals: bool,
    /// Canonicalize secondary unit designators
    pub unit_designators: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            delete_apostrophes: true,
            delete_periods: true,
            street_types: true,
            directionals: true,
            unit_designators: true,
        }
    }
}

/// Text normalizer applied to address fields before comparison.
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    options: NormalizeOptions,
}

impl FieldNormalizer {
    /// Create a new normalizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that only cleans case and punctuation.
    pub fn plain() -> Self {
        Self::new()
            .with_street_types(false)
            .with_directionals(false)
            .with_unit_designators(false)
    }

    /// Enable/disable lowercasing.
    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.options.lowercase = enabled;
        self
    }

    /// Enable/disable street-type canonicalization.
    pub fn with_street_types(mut self, enabled: bool) -> Self {
        self.options.street_types = enabled;
        self
    }

    /// Enable/disable directional canonicalization.
    pub fn with_directionals(mut self, enabled: bool) -> Self {
        self.options.directionals = enabled;
        self
    }

    /// Enable/disable unit designator canonicalization.
    pub fn with_unit_designators(mut self, enabled: bool) -> Self {
        self.options.unit_designators = enabled;
        self
    }

    /// Get the options used by this normalizer.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize one field value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use postal_screen::FieldNormalizer;
    ///
    /// let normalizer = FieldNormalizer::new();
    /// assert_eq!(normalizer.normalize("123 North Main Street."), "123 n main st");
    /// ```
    pub fn normalize(&self, input: &str) -> String {
        let mut cleaned = String::with_capacity(input.len());
        for ch in input.chars() {
            match ch {
                '\'' | '’' if self.options.delete_apostrophes => {}
                '.' if self.options.delete_periods => {}
                ch if ch.is_alphanumeric() => {
                    if self.options.lowercase {
                        cleaned.extend(ch.to_lowercase());
                    } else {
                        cleaned.push(ch);
                    }
                }
                _ => cleaned.push(' '),
            }
        }

        let mut out = String::with_capacity(cleaned.len());
        for token in cleaned.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(self.canonical_token(token));
        }
        out
    }

    fn canonical_token<'a>(&self, token: &'a str) -> &'a str {
        let lowered;
        let key = if self.options.lowercase {
            token
        } else {
            lowered = token.to_lowercase();
            lowered.as_str()
        };
        let maps = [
            (self.options.street_types, &*STREET_TYPE_MAP),
            (self.options.directionals, &*DIRECTIONAL_MAP),
            (self.options.unit_designators, &*UNIT_MAP),
        ];
        for (enabled, map) in maps {
            if enabled {
                if let Some(canonical) = map.get(key) {
                    return *canonical;
                }
            }
        }
        token
    }

    /// Normalize every text field of an address. The country is left as is
    /// because it is compared through [`crate::CountryResolver`].
    pub fn normalize_address(&self, address: &Address) -> Address {
        let apply = |value: Option<&str>| value.map(|v| self.normalize(v)).filter(|v| !v.is_empty());
        Address {
            line1: apply(address.line1()),
            line2: apply(address.line2()),
            city: apply(address.city()),
            state: apply(address.state()),
            postal_code: apply(address.postal_code()),
            country: address.country().map(str::to_string),
        }
    }

    /// Normalize multiple values in batch.
    pub fn normalize_batch(&self, inputs: &[&str]) -> Vec<String> {
        inputs.iter().map(|input| self.normalize(input)).collect()
    }
}

static DEFAULT_NORMALIZER: LazyLock<FieldNormalizer> = LazyLock::new(FieldNormalizer::new);

/// Normalize `input` with the default options.
pub fn canonicalize(input: &str) -> String {
    DEFAULT_NORMALIZER.normalize(input)
}
