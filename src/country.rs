//! Country name resolution to ISO 3166-1 alpha-2 codes.
//!
//! The reference table is static. The lookup index is built on first use and
//! never mutated afterwards, so concurrent reads need no synchronization.

use std::collections::HashMap;
use std::sync::LazyLock;

/// One row of the ISO 3166-1 reference table.
#[derive(Debug, Clone, Copy)]
pub struct CountryRecord {
    /// ISO 3166-1 alpha-2 code
    pub alpha2: &'static str,
    /// ISO 3166-1 alpha-3 code
    pub alpha3: &'static str,
    /// Common English short name
    pub name: &'static str,
    /// Additional spellings that resolve to this country
    pub aliases: &'static [&'static str],
}

const fn c(
    alpha2: &'static str,
    alpha3: &'static str,
    name: &'static str,
    aliases: &'static [&'static str],
) -> CountryRecord {
    CountryRecord {
        alpha2,
        alpha3,
        name,
        aliases,
    }
}

/// ISO 3166-1 countries with common English aliases.
pub static COUNTRIES: &[CountryRecord] = &[
    c("AD", "AND", "Andorra", &[]),
    c("AE", "ARE", "United Arab Emirates", &["UAE", "Emirates"]),
    c("AF", "AFG", "Afghanistan", &[]),
    c("AG", "ATG", "Antigua and Barbuda", &["Antigua"]),
    c("AI", "AIA", "Anguilla", &[]),
    c("AL", "ALB", "Albania", &[]),
    c("AM", "ARM", "Armenia", &[]),
    c("AO", "AGO", "Angola", &[]),
    c("AQ", "ATA", "Antarctica", &[]),
    c("AR", "ARG", "Argentina", &[]),
    c("AS", "ASM", "American Samoa", &[]),
    c("AT", "AUT", "Austria", &[]),
    c("AU", "AUS", "Australia", &[]),
    c("AW", "ABW", "Aruba", &[]),
    c("AX", "ALA", "Aland Islands", &["Åland Islands"]),
    c("AZ", "AZE", "Azerbaijan", &[]),
    c("BA", "BIH", "Bosnia and Herzegovina", &["Bosnia", "Bosnia-Herzegovina"]),
    c("BB", "BRB", "Barbados", &[]),
    c("BD", "BGD", "Bangladesh", &[]),
    c("BE", "BEL", "Belgium", &[]),
    c("BF", "BFA", "Burkina Faso", &[]),
    c("BG", "BGR", "Bulgaria", &[]),
    c("BH", "BHR", "Bahrain", &[]),
    c("BI", "BDI", "Burundi", &[]),
    c("BJ", "BEN", "Benin", &[]),
    c("BL", "BLM", "Saint Barthelemy", &["St Barthelemy", "Saint Barthélemy"]),
    c("BM", "BMU", "Bermuda", &[]),
    c("BN", "BRN", "Brunei", &["Brunei Darussalam"]),
    c("BO", "BOL", "Bolivia", &["Plurinational State of Bolivia"]),
    c("BQ", "BES", "Bonaire, Sint Eustatius and Saba", &["Caribbean Netherlands", "Bonaire"]),
    c("BR", "BRA", "Brazil", &["Brasil"]),
    c("BS", "BHS", "Bahamas", &["The Bahamas"]),
    c("BT", "BTN", "Bhutan", &[]),
    c("BV", "BVT", "Bouvet Island", &[]),
    c("BW", "BWA", "Botswana", &[]),
    c("BY", "BLR", "Belarus", &["Byelorussia"]),
    c("BZ", "BLZ", "Belize", &[]),
    c("CA", "CAN", "Canada", &[]),
    c("CC", "CCK", "Cocos (Keeling) Islands", &["Cocos Islands"]),
    c("CD", "COD", "Democratic Republic of the Congo", &["DR Congo", "DRC", "Congo-Kinshasa", "Zaire"]),
    c("CF", "CAF", "Central African Republic", &["CAR"]),
    c("CG", "COG", "Republic of the Congo", &["Congo", "Congo-Brazzaville"]),
    c("CH", "CHE", "Switzerland", &[]),
    c("CI", "CIV", "Cote d'Ivoire", &["Ivory Coast", "Côte d'Ivoire"]),
    c("CK", "COK", "Cook Islands", &[]),
    c("CL", "CHL", "Chile", &[]),
    c("CM", "CMR", "Cameroon", &[]),
    c("CN", "CHN", "China", &["People's Republic of China", "PRC"]),
    c("CO", "COL", "Colombia", &[]),
    c("CR", "CRI", "Costa Rica", &[]),
    c("CU", "CUB", "Cuba", &[]),
    c("CV", "CPV", "Cabo Verde", &["Cape Verde"]),
    c("CW", "CUW", "Curacao", &["Curaçao"]),
    c("CX", "CXR", "Christmas Island", &[]),
    c("CY", "CYP", "Cyprus", &[]),
    c("CZ", "CZE", "Czechia", &["Czech Republic"]),
    c("DE", "DEU", "Germany", &["Deutschland"]),
    c("DJ", "DJI", "Djibouti", &[]),
    c("DK", "DNK", "Denmark", &[]),
    c("DM", "DMA", "Dominica", &[]),
    c("DO", "DOM", "Dominican Republic", &[]),
    c("DZ", "DZA", "Algeria", &[]),
    c("EC", "ECU", "Ecuador", &[]),
    c("EE", "EST", "Estonia", &[]),
    c("EG", "EGY", "Egypt", &[]),
    c("EH", "ESH", "Western Sahara", &[]),
    c("ER", "ERI", "Eritrea", &[]),
    c("ES", "ESP", "Spain", &["España"]),
    c("ET", "ETH", "Ethiopia", &[]),
    c("FI", "FIN", "Finland", &[]),
    c("FJ", "FJI", "Fiji", &[]),
    c("FK", "FLK", "Falkland Islands", &["Falkland Islands (Malvinas)", "Malvinas"]),
    c("FM", "FSM", "Micronesia", &["Federated States of Micronesia"]),
    c("FO", "FRO", "Faroe Islands", &[]),
    c("FR", "FRA", "France", &[]),
    c("GA", "GAB", "Gabon", &[]),
    c("GB", "GBR", "United Kingdom", &["UK", "Great Britain", "Britain", "England", "Scotland", "Wales", "Northern Ireland", "United Kingdom of Great Britain and Northern Ireland"]),
    c("GD", "GRD", "Grenada", &[]),
    c("GE", "GEO", "Georgia", &[]),
    c("GF", "GUF", "French Guiana", &[]),
    c("GG", "GGY", "Guernsey", &[]),
    c("GH", "GHA", "Ghana", &[]),
    c("GI", "GIB", "Gibraltar", &[]),
    c("GL", "GRL", "Greenland", &[]),
    c("GM", "GMB", "Gambia", &["The Gambia"]),
    c("GN", "GIN", "Guinea", &[]),
    c("GP", "GLP", "Guadeloupe", &[]),
    c("GQ", "GNQ", "Equatorial Guinea", &[]),
    c("GR", "GRC", "Greece", &[]),
    c("GS", "SGS", "South Georgia and the South Sandwich Islands", &[]),
    c("GT", "GTM", "Guatemala", &[]),
    c("GU", "GUM", "Guam", &[]),
    c("GW", "GNB", "Guinea-Bissau", &[]),
    c("GY", "GUY", "Guyana", &[]),
    c("HK", "HKG", "Hong Kong", &[]),
    c("HM", "HMD", "Heard Island and McDonald Islands", &[]),
    c("HN", "HND", "Honduras", &[]),
    c("HR", "HRV", "Croatia", &[]),
    c("HT", "HTI", "Haiti", &[]),
    c("HU", "HUN", "Hungary", &[]),
    c("ID", "IDN", "Indonesia", &[]),
    c("IE", "IRL", "Ireland", &["Republic of Ireland", "Eire"]),
    c("IL", "ISR", "Israel", &[]),
    c("IM", "IMN", "Isle of Man", &[]),
    c("IN", "IND", "India", &[]),
    c("IO", "IOT", "British Indian Ocean Territory", &[]),
    c("IQ", "IRQ", "Iraq", &[]),
    c("IR", "IRN", "Iran", &["Islamic Republic of Iran", "Persia"]),
    c("IS", "ISL", "Iceland", &[]),
    c("IT", "ITA", "Italy", &["Italia"]),
    c("JE", "JEY", "Jersey", &[]),
    c("JM", "JAM", "Jamaica", &[]),
    c("JO", "JOR", "Jordan", &[]),
    c("JP", "JPN", "Japan", &[]),
    c("KE", "KEN", "Kenya", &[]),
    c("KG", "KGZ", "Kyrgyzstan", &["Kyrgyz Republic"]),
    c("KH", "KHM", "Cambodia", &[]),
    c("KI", "KIR", "Kiribati", &[]),
    c("KM", "COM", "Comoros", &[]),
    c("KN", "KNA", "Saint Kitts and Nevis", &["St Kitts and Nevis"]),
    c("KP", "PRK", "North Korea", &["DPRK", "Democratic People's Republic of Korea", "Korea, North"]),
    c("KR", "KOR", "South Korea", &["Republic of Korea", "Korea", "Korea, South"]),
    c("KW", "KWT", "Kuwait", &[]),
    c("KY", "CYM", "Cayman Islands", &[]),
    c("KZ", "KAZ", "Kazakhstan", &[]),
    c("LA", "LAO", "Laos", &["Lao People's Democratic Republic", "Lao PDR"]),
    c("LB", "LBN", "Lebanon", &[]),
    c("LC", "LCA", "Saint Lucia", &["St Lucia"]),
    c("LI", "LIE", "Liechtenstein", &[]),
    c("LK", "LKA", "Sri Lanka", &[]),
    c("LR", "LBR", "Liberia", &[]),
    c("LS", "LSO", "Lesotho", &[]),
    c("LT", "LTU", "Lithuania", &[]),
    c("LU", "LUX", "Luxembourg", &[]),
    c("LV", "LVA", "Latvia", &[]),
    c("LY", "LBY", "Libya", &[]),
    c("MA", "MAR", "Morocco", &[]),
    c("MC", "MCO", "Monaco", &[]),
    c("MD", "MDA", "Moldova", &["Republic of Moldova"]),
    c("ME", "MNE", "Montenegro", &[]),
    c("MF", "MAF", "Saint Martin", &["St Martin"]),
    c("MG", "MDG", "Madagascar", &[]),
    c("MH", "MHL", "Marshall Islands", &[]),
    c("MK", "MKD", "North Macedonia", &["Macedonia"]),
    c("ML", "MLI", "Mali", &[]),
    c("MM", "MMR", "Myanmar", &["Burma"]),
    c("MN", "MNG", "Mongolia", &[]),
    c("MO", "MAC", "Macao", &["Macau"]),
    c("MP", "MNP", "Northern Mariana Islands", &[]),
    c("MQ", "MTQ", "Martinique", &[]),
    c("MR", "MRT", "Mauritania", &[]),
    c("MS", "MSR", "Montserrat", &[]),
    c("MT", "MLT", "Malta", &[]),
    c("MU", "MUS", "Mauritius", &[]),
    c("MV", "MDV", "Maldives", &[]),
    c("MW", "MWI", "Malawi", &[]),
    c("MX", "MEX", "Mexico", &["México"]),
    c("MY", "MYS", "Malaysia", &[]),
    c("MZ", "MOZ", "Mozambique", &[]),
    c("NA", "NAM", "Namibia", &[]),
    c("NC", "NCL", "New Caledonia", &[]),
    c("NE", "NER", "Niger", &[]),
    c("NF", "NFK", "Norfolk Island", &[]),
    c("NG", "NGA", "Nigeria", &[]),
    c("NI", "NIC", "Nicaragua", &[]),
    c("NL", "NLD", "Netherlands", &["The Netherlands", "Holland"]),
    c("NO", "NOR", "Norway", &[]),
    c("NP", "NPL", "Nepal", &[]),
    c("NR", "NRU", "Nauru", &[]),
    c("NU", "NIU", "Niue", &[]),
    c("NZ", "NZL", "New Zealand", &[]),
    c("OM", "OMN", "Oman", &[]),
    c("PA", "PAN", "Panama", &[]),
    c("PE", "PER", "Peru", &[]),
    c("PF", "PYF", "French Polynesia", &[]),
    c("PG", "PNG", "Papua New Guinea", &[]),
    c("PH", "PHL", "Philippines", &[]),
    c("PK", "PAK", "Pakistan", &[]),
    c("PL", "POL", "Poland", &[]),
    c("PM", "SPM", "Saint Pierre and Miquelon", &[]),
    c("PN", "PCN", "Pitcairn", &["Pitcairn Islands"]),
    c("PR", "PRI", "Puerto Rico", &[]),
    c("PS", "PSE", "Palestine", &["State of Palestine", "Palestinian Territories"]),
    c("PT", "PRT", "Portugal", &[]),
    c("PW", "PLW", "Palau", &[]),
    c("PY", "PRY", "Paraguay", &[]),
    c("QA", "QAT", "Qatar", &[]),
    c("RE", "REU", "Reunion", &["Réunion"]),
    c("RO", "ROU", "Romania", &[]),
    c("RS", "SRB", "Serbia", &[]),
    c("RU", "RUS", "Russia", &["Russian Federation"]),
    c("RW", "RWA", "Rwanda", &[]),
    c("SA", "SAU", "Saudi Arabia", &["KSA"]),
    c("SB", "SLB", "Solomon Islands", &[]),
    c("SC", "SYC", "Seychelles", &[]),
    c("SD", "SDN", "Sudan", &[]),
    c("SE", "SWE", "Sweden", &[]),
    c("SG", "SGP", "Singapore", &[]),
    c("SH", "SHN", "Saint Helena", &["St Helena"]),
    c("SI", "SVN", "Slovenia", &[]),
    c("SJ", "SJM", "Svalbard and Jan Mayen", &[]),
    c("SK", "SVK", "Slovakia", &["Slovak Republic"]),
    c("SL", "SLE", "Sierra Leone", &[]),
    c("SM", "SMR", "San Marino", &[]),
    c("SN", "SEN", "Senegal", &[]),
    c("SO", "SOM", "Somalia", &[]),
    c("SR", "SUR", "Suriname", &[]),
    c("SS", "SSD", "South Sudan", &[]),
    c("ST", "STP", "Sao Tome and Principe", &["São Tomé and Príncipe"]),
    c("SV", "SLV", "El Salvador", &[]),
    c("SX", "SXM", "Sint Maarten", &[]),
    c("SY", "SYR", "Syria", &["Syrian Arab Republic"]),
    c("SZ", "SWZ", "Eswatini", &["Swaziland"]),
    c("TC", "TCA", "Turks and Caicos Islands", &[]),
    c("TD", "TCD", "Chad", &[]),
    c("TF", "ATF", "French Southern Territories", &[]),
    c("TG", "TGO", "Togo", &[]),
    c("TH", "THA", "Thailand", &[]),
    c("TJ", "TJK", "Tajikistan", &[]),
    c("TK", "TKL", "Tokelau", &[]),
    c("TL", "TLS", "Timor-Leste", &["East Timor"]),
    c("TM", "TKM", "Turkmenistan", &[]),
    c("TN", "TUN", "Tunisia", &[]),
    c("TO", "TON", "Tonga", &[]),
    c("TR", "TUR", "Turkey", &["Türkiye", "Turkiye"]),
    c("TT", "TTO", "Trinidad and Tobago", &[]),
    c("TV", "TUV", "Tuvalu", &[]),
    c("TW", "TWN", "Taiwan", &["Republic of China"]),
    c("TZ", "TZA", "Tanzania", &["United Republic of Tanzania"]),
    c("UA", "UKR", "Ukraine", &[]),
    c("UG", "UGA", "Uganda", &[]),
    c("UM", "UMI", "United States Minor Outlying Islands", &[]),
    c("US", "USA", "United States", &["United States of America", "America", "U.S.", "U.S.A."]),
    c("UY", "URY", "Uruguay", &[]),
    c("UZ", "UZB", "Uzbekistan", &[]),
    c("VA", "VAT", "Holy See", &["Vatican", "Vatican City"]),
    c("VC", "VCT", "Saint Vincent and the Grenadines", &["St Vincent and the Grenadines"]),
    c("VE", "VEN", "Venezuela", &["Bolivarian Republic of Venezuela"]),
    c("VG", "VGB", "British Virgin Islands", &["Virgin Islands, British"]),
    c("VI", "VIR", "U.S. Virgin Islands", &["US Virgin Islands", "Virgin Islands, U.S."]),
    c("VN", "VNM", "Vietnam", &["Viet Nam"]),
    c("VU", "VUT", "Vanuatu", &[]),
    c("WF", "WLF", "Wallis and Futuna", &[]),
    c("WS", "WSM", "Samoa", &[]),
    c("XK", "XKX", "Kosovo", &[]),
    c("YE", "YEM", "Yemen", &[]),
    c("YT", "MYT", "Mayotte", &[]),
    c("ZA", "ZAF", "South Africa", &[]),
    c("ZM", "ZMB", "Zambia", &[]),
    c("ZW", "ZWE", "Zimbabwe", &[]),
];

/// Canonical lookup key: uppercase, periods and apostrophes dropped, other
/// punctuation treated as whitespace.
fn lookup_key(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '.' | '\'' | '’' => {}
            ch if ch.is_alphanumeric() => cleaned.extend(ch.to_uppercase()),
            _ => cleaned.push(' '),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

static INDEX: LazyLock<HashMap<String, &'static CountryRecord>> = LazyLock::new(|| {
    let mut index = HashMap::with_capacity(COUNTRIES.len() * 4);
    for record in COUNTRIES {
        index.insert(lookup_key(record.alpha2), record);
        index.insert(lookup_key(record.alpha3), record);
        index.insert(lookup_key(record.name), record);
        for alias in record.aliases {
            index.entry(lookup_key(alias)).or_insert(record);
        }
    }
    index
});

/// Resolves free-text country names, aliases and codes to alpha-2 codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryResolver;

impl CountryResolver {
    /// Create a resolver over the built-in reference table.
    pub fn new() -> Self {
        Self
    }

    /// Resolve `raw` to an ISO alpha-2 code.
    ///
    /// Accepts alpha-2 codes, alpha-3 codes, English names and common aliases,
    /// case-insensitively. Returns `None` for anything unrecognized.
    pub fn resolve(&self, raw: &str) -> Option<&'static str> {
        self.lookup(raw).map(|record| record.alpha2)
    }

    /// Full reference record for `raw`, if recognized.
    pub fn lookup(&self, raw: &str) -> Option<&'static CountryRecord> {
        let key = lookup_key(raw);
        if key.is_empty() {
            return None;
        }
        INDEX.get(&key).copied()
    }
}

/// Resolve `raw` with the built-in table. See [`CountryResolver::resolve`].
pub fn resolve_country(raw: &str) -> Option<&'static str> {
    CountryResolver.resolve(raw)
}

/// English short name for an alpha-2 or alpha-3 code.
pub fn country_name(code: &str) -> Option<&'static str> {
    CountryResolver.lookup(code).map(|record| record.name)
}

/// Alpha-3 code for any recognized country spelling.
pub fn alpha3(raw: &str) -> Option<&'static str> {
    CountryResolver.lookup(raw).map(|record| record.alpha3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_united_states_variants() {
        for raw in ["US", "USA", "UNITED STATES", "united states of america", "U.S.A."] {
            assert_eq!(resolve_country(raw), Some("US"), "{raw}");
        }
    }

    #[test]
    fn test_codes_and_aliases() {
        assert_eq!(resolve_country("gbr"), Some("GB"));
        assert_eq!(resolve_country("Great Britain"), Some("GB"));
        assert_eq!(resolve_country("  russian federation "), Some("RU"));
        assert_eq!(resolve_country("DPRK"), Some("KP"));
        assert_eq!(resolve_country("Korea, South"), Some("KR"));
        assert_eq!(resolve_country("Cote d'Ivoire"), Some("CI"));
        assert_eq!(resolve_country("Guinea-Bissau"), Some("GW"));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(resolve_country("Atlantis"), None);
        assert_eq!(resolve_country(""), None);
        assert_eq!(resolve_country(" . "), None);
    }

    #[test]
    fn test_table_codes_are_unique() {
        let alpha2: HashSet<_> = COUNTRIES.iter().map(|c| c.alpha2).collect();
        let alpha3: HashSet<_> = COUNTRIES.iter().map(|c| c.alpha3).collect();
        assert_eq!(alpha2.len(), COUNTRIES.len());
        assert_eq!(alpha3.len(), COUNTRIES.len());
        assert!(COUNTRIES.iter().all(|c| c.alpha2.len() == 2 && c.alpha3.len() == 3));
    }

    #[test]
    fn test_names() {
        assert_eq!(country_name("de"), Some("Germany"));
        assert_eq!(country_name("DEU"), Some("Germany"));
        assert_eq!(alpha3("Holland"), Some("NLD"));
    }
}
