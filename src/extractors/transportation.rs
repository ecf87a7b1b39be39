//! Transportation options

use std::sync::LazyLock;

use regex::Regex;

use super::ExtractContext;
use crate::dedupe::dedupe_by_key;
use crate::model::{TransportKind, TransportOption};
use crate::text::{first_match, KeywordRule};

static TRANSPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)transport(?:ation)?|subway|metro|taxi|bus|walk|bike|cycling")
        .expect("valid regex")
});

static LEADING_NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\p{Alphabetic}]+").expect("valid regex"));

static KIND_RULES: [KeywordRule<TransportKind>; 5] = [
    KeywordRule::new(&["taxi"], TransportKind::Taxi),
    KeywordRule::new(&["bus"], TransportKind::Bus),
    KeywordRule::new(&["subway", "metro"], TransportKind::SubwayMetro),
    KeywordRule::new(&["walk"], TransportKind::Walking),
    KeywordRule::new(&["bike", "cycling"], TransportKind::BikingCycling),
];

/// Shorter lines are labels, not descriptions
const MIN_LINE_LEN: usize = 10;

/// One option per transport kind, taken from the first line mentioning it
pub fn extract_transportation(text: &str, ctx: &ExtractContext) -> Vec<TransportOption> {
    let candidates: Vec<TransportOption> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_LINE_LEN && TRANSPORT_LINE.is_match(line))
        .filter_map(|line| {
            let description = LEADING_NON_ALPHA.replace(line, "").replace("**", "");
            let description = description.trim();
            if description.is_empty() {
                return None;
            }
            Some(TransportOption {
                kind: first_match(&KIND_RULES, line)
                    .copied()
                    .unwrap_or(TransportKind::Generic),
                description: description.to_string(),
            })
        })
        .collect();

    let options = dedupe_by_key(candidates, |option| option.kind);
    if options.is_empty() && ctx.config.fallback_policy.synthesizes() {
        return vec![TransportOption {
            kind: TransportKind::Generic,
            description: format!(
                "Public transportation is an efficient and affordable way to get around {}.",
                ctx.place_name()
            ),
        }];
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractionConfig, FallbackPolicy};

    #[test]
    fn first_line_per_kind_in_priority_order() {
        let text = r#"Getting around:
- **Metro**: Ankaray and M1 lines cover the centre.
- Taxis are cheap; take a taxi from the bus station at night.
- Buses (EGO) need an Ankarakart.
- Walking is pleasant around Kızılay.
- The metro also reaches Koru.
Bus"#;
        let config = ExtractionConfig::default();
        let options = extract_transportation(text, &ExtractContext::new("Ankara", &config));

        let kinds: Vec<TransportKind> = options.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransportKind::SubwayMetro,
                TransportKind::Taxi,
                TransportKind::Bus,
                TransportKind::Walking
            ]
        );
        assert_eq!(options[0].description, "Metro: Ankaray and M1 lines cover the centre.");
        assert_eq!(
            options[1].description,
            "Taxis are cheap; take a taxi from the bus station at night."
        );
    }

    #[test]
    fn generic_kind_for_plain_transport_mentions() {
        let config = ExtractionConfig::default();
        let options = extract_transportation(
            "Public transportation runs until midnight.",
            &ExtractContext::new("Ankara", &config),
        );
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].kind, TransportKind::Generic);
    }

    #[test]
    fn empty_unless_synthesizing() {
        let config = ExtractionConfig::default();
        assert!(extract_transportation("", &ExtractContext::new("Ankara", &config)).is_empty());

        let config = ExtractionConfig {
            fallback_policy: FallbackPolicy::Synthesize,
            ..ExtractionConfig::default()
        };
        let options = extract_transportation("", &ExtractContext::new("Ankara", &config));
        assert_eq!(options.len(), 1);
        assert!(options[0].description.contains("Ankara"));
    }
}
