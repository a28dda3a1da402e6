//! Location augmentation of model answers.
//!
//! When a user query looks location-related (it contains one of the
//! configured keywords as a raw, case-insensitive substring), matching
//! records from the [`LocationIndex`] are appended to the answer as a
//! Markdown list. This is best effort: no match, no trigger, or an empty
//! index all leave the answer untouched, and augmentation never fails.

use std::sync::atomic::Ordering;

use tracing::{debug, debug_span, info};
use verdant_core::config::{AugmentationConfig, MatchPolicy};
use verdant_core::metrics::{AssistantCounters, spans};
use verdant_core::{LocationIndex, LocationRecord};

use crate::template::{
    LOCATION_BLOCK, LOCATIONS_INTRO, LOCATIONS_OUTRO, PHONE_LINE, WEBSITE_LINE, render_template,
};

/// Appends matched location facts to model output.
#[derive(Debug, Clone)]
pub struct ResponseAugmenter {
    index: LocationIndex,
    enabled: bool,
    /// Lowercased trigger keywords.
    keywords: Vec<String>,
    max_matches: usize,
    policy: MatchPolicy,
}

impl ResponseAugmenter {
    #[must_use]
    pub fn new(index: LocationIndex, config: &AugmentationConfig) -> Self {
        Self {
            index,
            enabled: config.enabled,
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            max_matches: config.max_matches,
            policy: config.match_policy,
        }
    }

    /// The table consulted for matches.
    #[must_use]
    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// Whether `query` contains any trigger keyword.
    #[must_use]
    pub fn is_location_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && query.contains(k.as_str()))
    }

    /// Up to `max_matches` records relevant to `query`, in index order.
    ///
    /// Does not check the keyword trigger.
    #[must_use]
    pub fn matches(&self, query: &str) -> Vec<&LocationRecord> {
        let query = query.to_lowercase();
        self.index
            .iter()
            .filter(|rec| self.record_matches(rec, &query))
            .take(self.max_matches)
            .collect()
    }

    fn record_matches(&self, rec: &LocationRecord, query: &str) -> bool {
        [rec.name.as_str(), rec.city.as_str()]
            .into_iter()
            .chain(rec.materials().iter().map(String::as_str))
            .any(|field| {
                let field = field.to_lowercase();
                field.contains(query)
                    || (self.policy == MatchPolicy::Bidirectional
                        && !field.is_empty()
                        && query.contains(field.as_str()))
            })
    }

    /// Return `model_text`, followed by matched locations when `user_query`
    /// is location-related and at least one record matches.
    #[must_use]
    pub fn augment(&self, user_query: &str, model_text: &str) -> String {
        if !self.enabled || !self.is_location_query(user_query) {
            return model_text.to_string();
        }
        let _span = debug_span!(spans::AUGMENT).entered();

        let hits = self.matches(user_query);
        if hits.is_empty() {
            debug!("Location query had no matching records");
            return model_text.to_string();
        }
        info!(
            matches = hits.len(),
            ids = ?hits.iter().map(|r| r.id).collect::<Vec<_>>(),
            "Appending locations to answer"
        );

        let blocks: Vec<String> = hits.iter().copied().map(format_record).collect();
        format!(
            "{model_text}\n\n{LOCATIONS_INTRO}\n\n{}\n\n{LOCATIONS_OUTRO}",
            blocks.join("\n\n")
        )
    }

    /// [`augment`](Self::augment), counting hits in `counters`.
    pub(crate) fn augment_counted(
        &self,
        user_query: &str,
        model_text: &str,
        counters: &AssistantCounters,
    ) -> String {
        let out = self.augment(user_query, model_text);
        if out.len() != model_text.len() {
            counters.augmentations.fetch_add(1, Ordering::Relaxed);
        }
        out
    }
}

/// Markdown block for one record.
#[must_use]
pub fn format_record(rec: &LocationRecord) -> String {
    let address = rec.full_address();
    let mut block = render_template(
        LOCATION_BLOCK,
        &[
            ("name", rec.name.as_str()),
            ("city", rec.city.as_str()),
            ("address", address.as_str()),
            ("type", rec.kind.as_str()),
        ],
    );
    if let Some(phone) = &rec.phone {
        block.push_str(&render_template(PHONE_LINE, &[("phone", phone.as_str())]));
    }
    if let Some(website) = &rec.website {
        block.push_str(&render_template(WEBSITE_LINE, &[("website", website.as_str())]));
    }
    block
}

#[cfg(test)]
mod tests {
    use verdant_core::{Category, Coordinates};

    use super::*;

    fn record(id: u32, name: &str, city: &str, materials: &[&str]) -> LocationRecord {
        LocationRecord {
            id,
            name: name.to_string(),
            kind: "Composting Center".to_string(),
            category: Category::Composting,
            coordinates: Coordinates::new(37.8, -122.2),
            address: format!("{id} Compost Way"),
            city: city.to_string(),
            state: "CA".to_string(),
            zip: "94612".to_string(),
            website: None,
            phone: None,
            materials: (!materials.is_empty())
                .then(|| materials.iter().map(ToString::to_string).collect()),
            workshops: None,
            produce: None,
            description: String::new(),
        }
    }

    fn augmenter(records: Vec<LocationRecord>, policy: MatchPolicy) -> ResponseAugmenter {
        let config = AugmentationConfig {
            match_policy: policy,
            ..AugmentationConfig::default()
        };
        ResponseAugmenter::new(
            LocationIndex::from_records(records).expect("records"),
            &config,
        )
    }

    #[test]
    fn keyword_trigger_is_substring_and_case_insensitive() {
        let aug = augmenter(vec![], MatchPolicy::Bidirectional);
        assert!(aug.is_location_query("WHERE is it"));
        assert!(aug.is_location_query("I love recycling"));
        assert!(aug.is_location_query("nowhere"));
        assert!(aug.is_location_query("Composting tips"));
        assert!(!aug.is_location_query("What is your favorite color?"));
    }

    #[test]
    fn untriggered_query_passes_through() {
        let aug = augmenter(
            vec![record(1, "Hub", "Oakland", &[])],
            MatchPolicy::Bidirectional,
        );
        assert_eq!(aug.augment("Tell me about Oakland", "raw"), "raw");
    }

    #[test]
    fn query_in_field_requires_whole_query_inside_a_field() {
        let aug = augmenter(
            vec![record(1, "Bay Area Composting Hub", "Oakland", &["Food waste"])],
            MatchPolicy::QueryInField,
        );
        assert_eq!(aug.matches("compost").len(), 1);
        assert_eq!(aug.matches("food").len(), 1);
        assert!(aug.matches("Where can I compost in Oakland?").is_empty());
    }

    #[test]
    fn bidirectional_finds_city_named_in_sentence() {
        let aug = augmenter(
            vec![
                record(1, "Green Earth Composting", "San Francisco", &[]),
                record(2, "Bay Area Composting Hub", "Oakland", &[]),
            ],
            MatchPolicy::Bidirectional,
        );
        let ids: Vec<u32> = aug
            .matches("Where can I compost in Oakland?")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn materials_are_matched() {
        let aug = augmenter(
            vec![
                record(1, "A", "X", &["Electronics", "Paper"]),
                record(2, "B", "Y", &[]),
            ],
            MatchPolicy::Bidirectional,
        );
        let out = aug.augment("where do I recycle paper", "answer");
        assert!(out.contains("**A**"));
        assert!(!out.contains("**B**"));
    }

    #[test]
    fn at_most_three_in_index_order() {
        let records = (1..=5)
            .map(|i| record(i, &format!("Site {i}"), "Oakland", &[]))
            .collect();
        let aug = augmenter(records, MatchPolicy::Bidirectional);
        let ids: Vec<u32> = aug.matches("oakland").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let out = aug.augment("where in oakland", "answer");
        assert_eq!(out.matches("- **").count(), 3);
    }

    #[test]
    fn augmented_layout() {
        let aug = augmenter(
            vec![record(2, "Bay Area Composting Hub", "Oakland", &[])],
            MatchPolicy::Bidirectional,
        );
        let out = aug.augment("Where can I compost in Oakland?", "Composting is great.");
        assert_eq!(
            out,
            "Composting is great.\n\n\
             Here are some relevant locations in the Bay Area:\n\n\
             - **Bay Area Composting Hub** in Oakland\n  \
             - Address: 2 Compost Way, Oakland, CA 94612\n  \
             - Type: Composting Center\n\n\
             You can find these and more locations on our interactive map page!"
        );
    }

    #[test]
    fn contact_lines_only_when_present() {
        let mut rec = record(1, "Green Earth Composting", "San Francisco", &[]);
        assert!(!format_record(&rec).contains("Phone"));
        assert!(!format_record(&rec).contains("Website"));

        rec.phone = Some("(415) 330-1300".into());
        rec.website = Some("https://www.greenearthcompost.com".into());
        let block = format_record(&rec);
        assert!(block.ends_with(
            "\n  - Phone: (415) 330-1300\n  - Website: https://www.greenearthcompost.com"
        ));
    }

    #[test]
    fn braces_in_record_fields_are_printed_verbatim() {
        let rec = record(7, "Depot {city} {type}", "Oakland", &[]);
        let block = format_record(&rec);
        assert!(block.starts_with("- **Depot {city} {type}** in Oakland\n"));
        assert!(block.contains("- Type: Composting Center"));
    }

    #[test]
    fn empty_index_never_fails() {
        let aug = ResponseAugmenter::new(LocationIndex::empty(), &AugmentationConfig::default());
        assert_eq!(aug.augment("where can I compost?", "text"), "text");
    }

    #[test]
    fn disabled_augmenter_passes_through() {
        let config = AugmentationConfig {
            enabled: false,
            ..AugmentationConfig::default()
        };
        let aug = ResponseAugmenter::new(
            LocationIndex::from_records(vec![record(1, "Hub", "Oakland", &[])]).expect("records"),
            &config,
        );
        assert_eq!(aug.augment("where in oakland", "text"), "text");
    }

    #[test]
    fn counted_augment_increments_only_on_hit() {
        let aug = augmenter(vec![record(1, "Hub", "Oakland", &[])], MatchPolicy::Bidirectional);
        let counters = AssistantCounters::new();
        aug.augment_counted("favorite color?", "x", &counters);
        aug.augment_counted("where in oakland", "x", &counters);
        assert_eq!(counters.snapshot().augmentations, 1);
    }
}
