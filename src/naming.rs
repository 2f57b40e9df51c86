//! Concept-name normalization.
//!
//! Facts, calculation arcs and sign markers arrive with the same concept
//! spelled in different qualification styles (`us-gaap:Assets`,
//! `us-gaap_Assets`, `{http://fasb.org/us-gaap/2024}Assets`). Grouping and
//! lookup both key on the canonical form produced here; original names are
//! preserved on the records themselves for reporting.

/// Extracts the local part of a qualified concept name, preserving case.
///
/// Handles Clark notation (`{ns}Local`), colon prefixes (`pfx:Local`) and
/// underscore prefixes (`pfx_Local`). Unqualified names pass through.
pub fn local_name(concept: &str) -> &str {
    if let Some(end) = concept.find('}') {
        // Clark notation: {namespace}LocalName
        return &concept[end + 1..];
    }
    if let Some(pos) = concept.rfind(':') {
        return &concept[pos + 1..];
    }
    // Underscore qualification uses the first separator only; local names
    // themselves may legitimately contain underscores.
    if let Some(pos) = concept.find('_') {
        return &concept[pos + 1..];
    }
    concept
}

/// Canonical comparison key: local name, lowercased, separators stripped.
pub fn normalize(concept: &str) -> String {
    local_name(concept)
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("us-gaap:Assets", "Assets")]
    #[case("{http://fasb.org/us-gaap/2024}NetIncome", "NetIncome")]
    #[case("us-gaap_Assets", "Assets")]
    #[case("v_CustomRevenue", "CustomRevenue")]
    #[case("Assets", "Assets")]
    fn extracts_local_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(local_name(input), expected);
    }

    #[rstest]
    #[case("us-gaap:Assets", "assets")]
    #[case("us-gaap_StockholdersEquity", "stockholdersequity")]
    #[case("Net Cash Provided", "netcashprovided")]
    #[case("", "")]
    fn normalizes_for_comparison(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn qualification_styles_collapse_to_one_key() {
        let forms = ["us-gaap:Assets", "us-gaap_Assets", "{ns}Assets"];
        let keys: Vec<String> = forms.iter().map(|f| normalize(f)).collect();
        assert!(keys.iter().all(|k| k == "assets"));
    }
}
