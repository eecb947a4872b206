//! Weighted address similarity scoring.
//!
//! Two addresses are compared field by field over a fixed, ordered table of
//! [`FieldDescriptor`]s. A field takes part only when both sides have a value,
//! so a sparse query is never penalized for what it leaves out. The result is
//! the weighted mean of the per-field scores:
//!
//! ```text
//! score = sum(weight_i * similarity_i) / sum(weight_i)    over present fields
//! ```
//!
//! Countries are resolved to ISO alpha-2 codes and compared exactly. All other
//! fields are case and punctuation normalized (see [`crate::normalizer`]) and
//! compared with token best-pairs Jaro-Winkler, so abbreviated and spelled-out
//! forms ("Street" vs "St") land just below an exact match.
//!
//! [`CANONICAL_ADDRESS_FIELDS`] additionally folds street types, directionals
//! and unit designators to one spelling before comparing, which scores such
//! variants as exact matches.

use crate::country::CountryResolver;
use crate::normalizer::{FieldNormalizer, canonicalize};
use crate::similarity::{StringSimilarity, TokenJaroWinkler};
use crate::types::{Address, AddressField};
use std::fmt;
use std::io::Write;
use std::sync::LazyLock;

/// How a field's two values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Normalize, then string similarity.
    Fuzzy,
    /// Resolve to ISO codes and compare exactly, falling back to
    /// [`Comparison::Fuzzy`] when either side is not a known country.
    CountryCode,
}

/// One entry of the scoring table.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// Which field this entry scores
    pub field: AddressField,
    /// Relative contribution to the aggregate; must be positive
    pub weight: f64,
    /// Pulls the field's value out of an address, `None` when absent
    pub extract: fn(&Address) -> Option<&str>,
    /// Canonical form used for fuzzy comparison
    pub normalize: fn(&str) -> String,
    /// Comparison strategy
    pub comparison: Comparison,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field", &self.field)
            .field("weight", &self.weight)
            .field("comparison", &self.comparison)
            .finish_non_exhaustive()
    }
}

fn plain(raw: &str) -> String {
    static PLAIN: LazyLock<FieldNormalizer> = LazyLock::new(FieldNormalizer::plain);
    PLAIN.normalize(raw)
}

/// Default scoring table.
pub static ADDRESS_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor {
        field: AddressField::Line1,
        weight: 2.5,
        extract: Address::line1,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::Line2,
        weight: 1.0,
        extract: Address::line2,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::City,
        weight: 2.0,
        extract: Address::city,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::State,
        weight: 1.0,
        extract: Address::state,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::PostalCode,
        weight: 1.5,
        extract: Address::postal_code,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::Country,
        weight: 2.0,
        extract: Address::country,
        normalize: plain,
        comparison: Comparison::CountryCode,
    },
];

/// Default weights with street lines canonicalized through
/// [`canonicalize`] ("Avenue" and "Ave" compare equal).
pub static CANONICAL_ADDRESS_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor {
        field: AddressField::Line1,
        weight: 2.5,
        extract: Address::line1,
        normalize: canonicalize,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::Line2,
        weight: 1.0,
        extract: Address::line2,
        normalize: canonicalize,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::City,
        weight: 2.0,
        extract: Address::city,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::State,
        weight: 1.0,
        extract: Address::state,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::PostalCode,
        weight: 1.5,
        extract: Address::postal_code,
        normalize: plain,
        comparison: Comparison::Fuzzy,
    },
    FieldDescriptor {
        field: AddressField::Country,
        weight: 2.0,
        extract: Address::country,
        normalize: plain,
        comparison: Comparison::CountryCode,
    },
];

/// Score of one field that took part in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTrace {
    /// Field compared
    pub field: AddressField,
    /// Weight the field contributed
    pub weight: f64,
    /// Query value after normalization (or its country code)
    pub query: String,
    /// Candidate value after normalization (or its country code)
    pub candidate: String,
    /// Field similarity in `[0, 1]`
    pub score: f64,
}

/// Receives one [`FieldTrace`] per evaluated field.
///
/// Purely observational; a sink never influences the score.
pub trait TraceSink {
    /// Record one field comparison.
    fn record(&mut self, trace: &FieldTrace);
}

impl TraceSink for Vec<FieldTrace> {
    fn record(&mut self, trace: &FieldTrace) {
        self.push(trace.clone());
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn record(&mut self, trace: &FieldTrace) {
        (**self).record(trace);
    }
}

/// Discards traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _trace: &FieldTrace) {}
}

/// Writes one line per field to an [`std::io::Write`]. Write errors are ignored.
#[derive(Debug)]
pub struct WriterSink<W: Write>(
    /// Destination of the trace lines
    pub W,
);

impl<W: Write> TraceSink for WriterSink<W> {
    fn record(&mut self, trace: &FieldTrace) {
        let _ = writeln!(
            self.0,
            "{}: query={:?} candidate={:?} score={:.3}",
            trace.field, trace.query, trace.candidate, trace.score
        );
    }
}

/// Emits each trace as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, trace: &FieldTrace) {
        tracing::debug!(
            field = %trace.field,
            query = %trace.query,
            candidate = %trace.candidate,
            score = trace.score,
            "address field compared"
        );
    }
}

/// Highest-scoring pair between two address lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Similarity of the pair
    pub score: f64,
    /// Index into the query list
    pub query_index: usize,
    /// Index into the candidate list
    pub candidate_index: usize,
}

/// Compares structured addresses.
///
/// Stateless after construction and safe to share across threads.
///
/// # Examples
///
/// ```rust
/// use postal_screen::{Address, AddressScorer};
///
/// let scorer = AddressScorer::new();
/// let query = Address::new().with_line1("123 Main St").with_city("Boston");
/// let candidate = Address::new()
///     .with_line1("123 Main St")
///     .with_city("Boston")
///     .with_state("MA");
///
/// assert_eq!(scorer.compare(&query, &candidate), 1.0);
/// ```
pub struct AddressScorer {
    fields: &'static [FieldDescriptor],
    similarity: Box<dyn StringSimilarity>,
    countries: CountryResolver,
}

impl fmt::Debug for AddressScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressScorer")
            .field("fields", &self.fields)
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

impl Default for AddressScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressScorer {
    /// Scorer over the default table and token Jaro-Winkler.
    pub fn new() -> Self {
        Self {
            fields: &ADDRESS_FIELDS,
            similarity: Box::new(TokenJaroWinkler::new()),
            countries: CountryResolver::new(),
        }
    }

    /// Replace the string similarity measure.
    pub fn with_similarity(mut self, similarity: impl StringSimilarity + 'static) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    /// Replace the field table.
    pub fn with_fields(mut self, fields: &'static [FieldDescriptor]) -> Self {
        self.fields = fields;
        self
    }

    /// The field table in evaluation order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        self.fields
    }

    /// Similarity of `query` and `candidate` in `[0, 1]`.
    ///
    /// Returns `0.0` when the two addresses share no present field.
    pub fn compare(&self, query: &Address, candidate: &Address) -> f64 {
        self.compare_traced(query, candidate, &mut NoTrace)
    }

    /// Like [`compare`](Self::compare), reporting every evaluated field to `sink`.
    pub fn compare_traced(
        &self,
        query: &Address,
        candidate: &Address,
        sink: &mut dyn TraceSink,
    ) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for descriptor in self.fields {
            if descriptor.weight <= 0.0 {
                continue;
            }
            let Some(trace) = self.compare_field(descriptor, query, candidate) else {
                continue;
            };
            weighted += descriptor.weight * trace.score;
            total_weight += descriptor.weight;
            sink.record(&trace);
        }

        if total_weight == 0.0 {
            return 0.0;
        }
        (weighted / total_weight).clamp(0.0, 1.0)
    }

    /// Score a single field, `None` when it is absent on either side.
    pub fn compare_field(
        &self,
        descriptor: &FieldDescriptor,
        query: &Address,
        candidate: &Address,
    ) -> Option<FieldTrace> {
        let query_raw = (descriptor.extract)(query)?;
        let candidate_raw = (descriptor.extract)(candidate)?;

        if descriptor.comparison == Comparison::CountryCode {
            let codes = (
                self.countries.resolve(query_raw),
                self.countries.resolve(candidate_raw),
            );
            if let (Some(q), Some(c)) = codes {
                return Some(FieldTrace {
                    field: descriptor.field,
                    weight: descriptor.weight,
                    query: q.to_string(),
                    candidate: c.to_string(),
                    score: if q == c { 1.0 } else { 0.0 },
                });
            }
        }

        let query_norm = (descriptor.normalize)(query_raw);
        let candidate_norm = (descriptor.normalize)(candidate_raw);
        if query_norm.is_empty() || candidate_norm.is_empty() {
            return None;
        }

        let score = self.similarity.similarity(&query_norm, &candidate_norm);
        Some(FieldTrace {
            field: descriptor.field,
            weight: descriptor.weight,
            query: query_norm,
            candidate: candidate_norm,
            score: score.clamp(0.0, 1.0),
        })
    }

    /// Best pair across two address lists, for records carrying several
    /// addresses. Ties keep the first pair found. `None` when either list is
    /// empty.
    pub fn best_match(&self, queries: &[Address], candidates: &[Address]) -> Option<BestMatch> {
        let mut best: Option<BestMatch> = None;
        for (query_index, query) in queries.iter().enumerate() {
            for (candidate_index, candidate) in candidates.iter().enumerate() {
                let score = self.compare(query, candidate);
                if best.is_none_or(|b| score > b.score) {
                    best = Some(BestMatch {
                        score,
                        query_index,
                        candidate_index,
                    });
                }
            }
        }
        best
    }

    /// Score `query` against every candidate, in input order.
    pub fn compare_batch(&self, query: &Address, candidates: &[Address]) -> Vec<f64> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            candidates
                .par_iter()
                .map(|candidate| self.compare(query, candidate))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            candidates
                .iter()
                .map(|candidate| self.compare(query, candidate))
                .collect()
        }
    }
}

static DEFAULT_SCORER: LazyLock<AddressScorer> = LazyLock::new(AddressScorer::new);

/// Compare two addresses with the default scorer.
///
/// # Examples
///
/// ```rust
/// use postal_screen::{Address, compare};
///
/// let query = Address::new().with_country("United States");
/// let candidate = Address::new().with_country("US");
/// assert_eq!(compare(&query, &candidate), 1.0);
/// ```
pub fn compare(query: &Address, candidate: &Address) -> f64 {
    DEFAULT_SCORER.compare(query, candidate)
}

/// Compare two addresses with the default scorer, tracing each field to `sink`.
pub fn compare_traced(query: &Address, candidate: &Address, sink: &mut dyn TraceSink) -> f64 {
    DEFAULT_SCORER.compare_traced(query, candidate, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::JaroWinkler;

    fn full() -> Address {
        Address::new()
            .with_line1("1600 Pennsylvania Avenue NW")
            .with_line2("West Wing")
            .with_city("Washington")
            .with_state("DC")
            .with_postal_code("20500")
            .with_country("United States")
    }

    #[test]
    fn test_self_match() {
        let address = full();
        assert_eq!(compare(&address, &address), 1.0);
    }

    #[test]
    fn test_no_shared_fields() {
        let query = Address::new().with_city("Boston");
        let candidate = Address::new().with_postal_code("02108");
        assert_eq!(compare(&query, &candidate), 0.0);
        assert_eq!(compare(&Address::new(), &Address::new()), 0.0);
    }

    #[test]
    fn test_blank_and_punctuation_only_fields_are_absent() {
        let query = Address::new().with_city("Boston").with_line1("  ");
        let candidate = Address::new().with_city("Boston").with_line1("...");
        assert_eq!(compare(&query, &candidate), 1.0);
    }

    #[test]
    fn test_trace_reports_evaluated_fields_in_order() {
        let query = Address::new()
            .with_line1("123 Main Street")
            .with_city("Boston")
            .with_country("USA");
        let candidate = Address::new()
            .with_line1("123 Main St")
            .with_city("Boston")
            .with_state("MA")
            .with_country("united states");

        let mut traces = Vec::new();
        let traced = compare_traced(&query, &candidate, &mut traces);
        assert_eq!(traced, compare(&query, &candidate));

        let fields: Vec<_> = traces.iter().map(|t| t.field).collect();
        assert_eq!(
            fields,
            vec![AddressField::Line1, AddressField::City, AddressField::Country]
        );
        assert_eq!(traces[0].query, "123 main street");
        assert_eq!(traces[0].candidate, "123 main st");
        assert!((traces[0].score - 0.9407).abs() < 1e-4);
        assert_eq!(traces[2].query, "US");
        assert_eq!(traces[2].score, 1.0);
    }

    #[test]
    fn test_writer_sink() {
        let query = Address::new().with_postal_code("90210");
        let mut sink = WriterSink(Vec::new());
        compare_traced(&query, &query, &mut sink);
        let written = String::from_utf8(sink.0).unwrap();
        assert_eq!(
            written,
            "postal_code: query=\"90210\" candidate=\"90210\" score=1.000\n"
        );
    }

    #[test]
    fn test_country_mismatch_and_fallback() {
        let canada = Address::new().with_country("Canada");
        let us = Address::new().with_country("US");
        assert_eq!(compare(&canada, &us), 0.0);

        let unknown = Address::new().with_country("Atlantis");
        assert_eq!(compare(&unknown, &unknown), 1.0);

        let mut traces = Vec::new();
        let score = compare_traced(&unknown, &Address::new().with_country("Atlantic"), &mut traces);
        assert!(score > 0.8 && score < 1.0, "{score}");
        assert_eq!(traces[0].query, "atlantis");
    }

    #[test]
    fn test_whitespace_noise_does_not_lower_score() {
        let query = Address::new().with_city("New  York").with_line1("123  Main St.");
        let candidate = Address::new().with_city("New York").with_line1("123 Main St");
        assert_eq!(compare(&query, &candidate), 1.0);
    }

    #[test]
    fn test_canonical_table_folds_abbreviations() {
        let scorer = AddressScorer::new().with_fields(&CANONICAL_ADDRESS_FIELDS);
        let query = Address::new().with_line1("45 Park Avenue South").with_city("New York");
        let candidate = Address::new().with_line1("45 Park Ave S").with_city("New York");
        assert_eq!(scorer.compare(&query, &candidate), 1.0);
        assert!(compare(&query, &candidate) < 1.0);
    }

    #[test]
    fn test_best_match() {
        let queries = vec![
            Address::new().with_city("Chicago"),
            Address::new().with_line1("123 Main St").with_city("Boston"),
        ];
        let candidates = vec![
            Address::new().with_city("Denver"),
            Address::new().with_line1("123 Main St").with_city("Boston"),
        ];

        let best = AddressScorer::new().best_match(&queries, &candidates).unwrap();
        assert_eq!(best.score, 1.0);
        assert_eq!((best.query_index, best.candidate_index), (1, 1));
        assert!(AddressScorer::new().best_match(&queries, &[]).is_none());
    }

    #[test]
    fn test_compare_batch_keeps_order() {
        let query = Address::new().with_city("Boston");
        let candidates = vec![
            Address::new().with_city("Chicago"),
            Address::new().with_city("Boston"),
            Address::new(),
        ];
        let scores = AddressScorer::new().compare_batch(&query, &candidates);
        assert_eq!(scores.len(), 3);
        assert!(scores[0] < 0.5);
        assert_eq!(scores[1], 1.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_custom_similarity_and_fields() {
        static CITY_ONLY: [FieldDescriptor; 1] = [FieldDescriptor {
            field: AddressField::City,
            weight: 1.0,
            extract: Address::city,
            normalize: canonicalize,
            comparison: Comparison::Fuzzy,
        }];

        let scorer = AddressScorer::new()
            .with_similarity(JaroWinkler::new())
            .with_fields(&CITY_ONLY);
        assert_eq!(scorer.fields().len(), 1);

        let query = Address::new().with_city("Boston").with_line1("1 Main St");
        let candidate = Address::new().with_city("Boston").with_line1("99 Elm St");
        assert_eq!(scorer.compare(&query, &candidate), 1.0);
        assert!(format!("{scorer:?}").contains("jaro_winkler"));
    }
}
