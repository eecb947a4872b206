use postal_screen::{Address, AddressField, AddressScorer, CountryResolver, FieldTrace, compare};

fn assert_score(query: &Address, candidate: &Address, expected: f64) {
    let score = compare(query, candidate);
    assert!(
        (score - expected).abs() <= 0.001,
        "expected {expected:.3}, got {score:.6}"
    );
}

fn line1(value: &str) -> Address {
    Address::new().with_line1(value)
}

fn street(line1: &str, city: &str, state: &str) -> Address {
    Address::new()
        .with_line1(line1)
        .with_city(city)
        .with_state(state)
}

#[test]
fn test_only_line1_exact() {
    assert_score(&line1("123 Main St"), &line1("123 Main St"), 1.0);
}

#[test]
fn test_only_line1_close() {
    assert_score(&line1("123 Main Street"), &line1("123 Main St"), 0.941);
}

#[test]
fn test_only_line1_different_number() {
    assert_score(&line1("124 Main St"), &line1("123 Main St"), 0.941);
}

#[test]
fn test_only_city() {
    let city = Address::new().with_city("New York");
    assert_score(&city, &city, 1.0);
}

#[test]
fn test_similar_cities() {
    let query = Address::new().with_city("Los Angeles");
    let candidate = Address::new().with_city("Los Angles");
    assert_score(&query, &candidate, 0.964);
}

#[test]
fn test_only_postal() {
    let postal = Address::new().with_postal_code("90210");
    assert_score(&postal, &postal, 1.0);
}

#[test]
fn test_similar_addresses_different_units() {
    let query = street("123 Main St Apt 4B", "New York", "NY");
    let candidate = street("123 Main St Apt 4C", "New York", "NY");
    assert_score(&query, &candidate, 0.969);
}

#[test]
fn test_similar_addresses_different_line2() {
    let query = street("123 Main St", "New York", "NY").with_line2("Apt 4B");
    let candidate = street("123 Main St", "New York", "NY").with_line2("Apt 4C");
    assert_score(&query, &candidate, 0.974);
}

#[test]
fn test_country_code_vs_name() {
    let query = Address::new().with_country("United States");
    let candidate = Address::new().with_country("US");
    assert_score(&query, &candidate, 1.0);
}

#[test]
fn test_complex_partial_match() {
    let query = street("1234 Broadway Suite 500", "New York", "NY")
        .with_postal_code("10013")
        .with_country("US");
    let candidate = Address::new()
        .with_line1("1234 Broadway")
        .with_city("New York")
        .with_postal_code("10013");
    assert_score(&query, &candidate, 0.792);
}

#[test]
fn test_tricky_similar_but_different() {
    let query = street("45 Park Avenue South", "New York", "NY");
    let candidate = street("45 Park Avenue North", "New York", "NY");
    assert_score(&query, &candidate, 0.969);
}

#[test]
fn test_ambiguous_addresses() {
    let query = Address::new()
        .with_line1("100 Washington St")
        .with_city("Boston");
    let candidate = Address::new()
        .with_line1("100 Washington Ave")
        .with_city("Boston");
    assert_score(&query, &candidate, 0.815);
}

#[test]
fn test_missing_fields_comparison() {
    let query = Address::new()
        .with_line1("555 Market St")
        .with_city("San Francisco");
    let candidate = Address::new()
        .with_line1("555 Market St")
        .with_line2("Floor 2")
        .with_city("San Francisco")
        .with_state("CA")
        .with_country("US");
    assert_score(&query, &candidate, 1.0);
}

#[test]
fn test_completely_different_addresses() {
    let query = street("123 Main St", "Boston", "MA");
    let candidate = street("456 Oak Ave", "Chicago", "IL");
    assert_score(&query, &candidate, 0.239);
}

#[test]
fn test_similar_looking_but_different() {
    let query = street("1 World Trade Center", "New York", "NY");
    let candidate = street("2 World Trade Center", "New York", "NY");
    assert_score(&query, &candidate, 0.886);
}

#[test]
fn test_transposed_numbers() {
    let query = Address::new()
        .with_line1("123 Main St")
        .with_city("Anytown");
    let candidate = Address::new()
        .with_line1("321 Main St")
        .with_city("Anytown");
    assert_score(&query, &candidate, 0.918);
}

#[test]
fn test_unknown_country_matches_itself() {
    let country = Address::new().with_country("Atlantis");
    assert_eq!(compare(&country, &country), 1.0);
}

#[test]
fn test_repeated_whitespace_is_not_a_difference() {
    let query = Address::new().with_city("New  York");
    let candidate = Address::new().with_city("New York");
    assert_eq!(compare(&query, &candidate), 1.0);

    let query = line1("  123   Main St ").with_city("Boston");
    let candidate = line1("123 Main St").with_city("Boston");
    assert_eq!(compare(&query, &candidate), 1.0);
}

#[test]
fn test_country_aliases() {
    let query = Address::new().with_country("United States");
    let candidate = Address::new().with_country("US");
    assert_eq!(compare(&query, &candidate), 1.0);

    let canada = Address::new().with_country("Canada");
    assert_eq!(compare(&canada, &candidate), 0.0);

    let resolver = CountryResolver::new();
    for raw in ["US", "USA", "UNITED STATES", "united states of america"] {
        assert_eq!(resolver.resolve(raw), Some("US"), "{raw}");
    }
}

#[test]
fn test_self_match_with_every_field() {
    let address = Address::new()
        .with_line1("350 Fifth Avenue")
        .with_line2("Floor 86")
        .with_city("New York")
        .with_state("NY")
        .with_postal_code("10118")
        .with_country("USA");
    assert_eq!(compare(&address, &address), 1.0);
}

#[test]
fn test_scores_stay_in_range_and_are_deterministic() {
    let addresses = [
        Address::new(),
        line1("!!!"),
        line1("123 Main St").with_country("Narnia"),
        Address::new().with_city("São Paulo").with_country("Brasil"),
        Address::new().with_city("Sao Paulo").with_country("BR"),
        Address::new().with_postal_code("SW1A 1AA").with_country("UK"),
    ];
    for a in &addresses {
        for b in &addresses {
            let score = compare(a, b);
            assert!((0.0..=1.0).contains(&score), "{score}");
            assert_eq!(score, compare(a, b));
        }
    }
}

#[test]
fn test_trace_does_not_change_score() {
    let scorer = AddressScorer::new();
    let query = Address::new()
        .with_line1("100 Washington St")
        .with_city("Boston");
    let candidate = Address::new()
        .with_line1("100 Washington Ave")
        .with_city("Boston");

    let mut traces: Vec<FieldTrace> = Vec::new();
    let traced = scorer.compare_traced(&query, &candidate, &mut traces);
    assert_eq!(traced, scorer.compare(&query, &candidate));

    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].field, AddressField::Line1);
    assert_eq!(traces[0].query, "100 washington st");
    assert_eq!(traces[0].candidate, "100 washington ave");
    assert!((traces[0].score - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(traces[1].score, 1.0);
}
