//! String similarity primitives.
//!
//! Every measure returns a value in `[0.0, 1.0]`, where `1.0` means identical.
//! The scorer consumes them through the [`StringSimilarity`] trait.

/// A normalized string similarity measure.
pub trait StringSimilarity: Send + Sync {
    /// Similarity of `a` and `b` in `[0.0, 1.0]`.
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Name of the measure, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Jaro similarity of two strings, compared by `char`.
pub fn jaro(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if b_matched[j] || b[j] != *ca {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, ca) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ca != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity with the given prefix weight and prefix cap.
///
/// The prefix bonus only applies once the Jaro score exceeds
/// `boost_threshold`; pairs at or below it keep their plain Jaro score.
pub fn jaro_winkler_with(
    a: &str,
    b: &str,
    prefix_weight: f64,
    max_prefix: usize,
    boost_threshold: f64,
) -> f64 {
    let sim = jaro(a, b);
    if sim <= boost_threshold {
        return sim;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(max_prefix)
        .take_while(|(x, y)| x == y)
        .count();
    (sim + prefix_weight * prefix as f64 * (1.0 - sim)).clamp(0.0, 1.0)
}

/// Jaro-Winkler similarity with Winkler's defaults: 0.1 prefix weight over
/// at most four characters, boosted above a Jaro score of 0.7.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    jaro_winkler_with(a, b, 0.1, 4, 0.7)
}

/// Jaro-Winkler over whole strings.
#[derive(Debug, Clone, PartialEq)]
pub struct JaroWinkler {
    /// Prefix weight (0.0 to 0.25)
    pub prefix_weight: f64,
    /// Maximum prefix length considered
    pub max_prefix: usize,
    /// Jaro score a pair must exceed before the prefix bonus applies
    pub boost_threshold: f64,
}

impl Default for JaroWinkler {
    fn default() -> Self {
        Self {
            prefix_weight: 0.1,
            max_prefix: 4,
            boost_threshold: 0.7,
        }
    }
}

impl JaroWinkler {
    /// Create the standard configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix weight, clamped to `[0.0, 0.25]` to keep scores in range.
    pub fn with_prefix_weight(mut self, weight: f64) -> Self {
        self.prefix_weight = weight.clamp(0.0, 0.25);
        self
    }

    /// Set the boost threshold. `0.0` boosts every pair with a shared prefix.
    pub fn with_boost_threshold(mut self, threshold: f64) -> Self {
        self.boost_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

impl StringSimilarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        jaro_winkler_with(
            a,
            b,
            self.prefix_weight,
            self.max_prefix,
            self.boost_threshold,
        )
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Token-level best-pairs matching.
///
/// Both inputs are split on whitespace. Every query token is scored against
/// every candidate token with the inner measure, then pairs are taken greedily
/// from the highest score down, each token used at most once. Ties keep query
/// order, then candidate order. The result is the mean pair score over the
/// longer token list, so every unmatched token on either side counts as zero.
#[derive(Debug, Clone, Default)]
pub struct TokenJaroWinkler {
    inner: JaroWinkler,
}

impl TokenJaroWinkler {
    /// Create a best-pairs matcher over standard Jaro-Winkler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a best-pairs matcher over a configured Jaro-Winkler.
    pub fn with_inner(inner: JaroWinkler) -> Self {
        Self { inner }
    }
}

impl StringSimilarity for TokenJaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        best_pairs(a, b, |x, y| self.inner.similarity(x, y))
    }

    fn name(&self) -> &'static str {
        "token_jaro_winkler"
    }
}

/// Best-pairs token similarity with an arbitrary token measure.
/// See [`TokenJaroWinkler`].
pub fn best_pairs<F>(query: &str, candidate: &str, token_similarity: F) -> f64
where
    F: Fn(&str, &str) -> f64,
{
    let query: Vec<&str> = query.split_whitespace().collect();
    let candidate: Vec<&str> = candidate.split_whitespace().collect();
    if query.is_empty() || candidate.is_empty() {
        return if query.is_empty() && candidate.is_empty() {
            1.0
        } else {
            0.0
        };
    }

    let mut pairs = Vec::with_capacity(query.len() * candidate.len());
    for (qi, q) in query.iter().enumerate() {
        for (ci, c) in candidate.iter().enumerate() {
            pairs.push((token_similarity(q, c), qi, ci));
        }
    }
    // Stable: equal scores keep (query, candidate) order.
    pairs.sort_by(|x, y| y.0.total_cmp(&x.0));

    let mut query_used = vec![false; query.len()];
    let mut candidate_used = vec![false; candidate.len()];
    let mut matched = 0.0;
    for (score, qi, ci) in pairs {
        if query_used[qi] || candidate_used[ci] {
            continue;
        }
        query_used[qi] = true;
        candidate_used[ci] = true;
        matched += score;
    }

    let slots = query.len().max(candidate.len());
    (matched / slots as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_jaro_known_values() {
        assert!(approx(jaro("martha", "marhta"), 0.9444));
        assert!(approx(jaro("dixon", "dicksonx"), 0.7667));
        assert_eq!(jaro("", ""), 1.0);
        assert_eq!(jaro("abc", ""), 0.0);
        assert_eq!(jaro("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_jaro_winkler_known_values() {
        assert!(approx(jaro_winkler("martha", "marhta"), 0.9611));
        assert!(approx(jaro_winkler("dixon", "dicksonx"), 0.8133));
        assert!(approx(jaro_winkler("124", "123"), 0.8222));
        assert!(approx(jaro_winkler("boston", "chicago"), 0.4365));
        assert!(approx(jaro_winkler("angeles", "angles"), 0.9278));
    }

    #[test]
    fn test_boost_threshold() {
        // Jaro of 2/3 sits below the default threshold, so no prefix bonus.
        assert!(approx(jaro_winkler("4b", "4c"), 0.6667));
        let eager = JaroWinkler::new().with_boost_threshold(0.0);
        assert!(approx(eager.similarity("4b", "4c"), 0.7));
    }

    #[test]
    fn test_best_pairs() {
        let measure = TokenJaroWinkler::new();
        assert_eq!(measure.similarity("new york", "new york"), 1.0);
        assert_eq!(measure.similarity("york new", "new york"), 1.0);
        assert!(approx(measure.similarity("124 main st", "123 main st"), 0.9407));
        assert!(approx(measure.similarity("123 main st", "456 oak ave"), 0.1759));
        assert!(approx(measure.similarity("los angeles", "los angles"), 0.9639));
    }

    #[test]
    fn test_best_pairs_unmatched_tokens_lower_score() {
        let measure = TokenJaroWinkler::new();
        let short = measure.similarity("1234 broadway", "1234 broadway");
        let long = measure.similarity("1234 broadway ste 500", "1234 broadway");
        assert_eq!(short, 1.0);
        assert_eq!(long, 0.5);
        assert_eq!(measure.similarity("1234 broadway", "1234 broadway ste 500"), 0.5);
        assert_eq!(measure.similarity("", "main"), 0.0);
    }

    #[test]
    fn test_scores_are_bounded() {
        let measure = JaroWinkler::new().with_prefix_weight(0.9);
        assert_eq!(measure.prefix_weight, 0.25);
        for (a, b) in [("aaaa", "aaab"), ("ab", "ba"), ("ü", "u")] {
            let score = measure.similarity(a, b);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
