use std::collections::BTreeMap;

use claims_map::{EngineOptions, InMemoryTable, MappingEngine, suggest_mapping};
use claims_model::TargetLayout;
use proptest::prelude::*;

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{5}",
        "[0-9]{10}",
        "[0-9]{5}-[0-9]{4}",
        "[A-TV-Z][0-9][0-9A-Z]\\.[0-9]{1,2}",
        "[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}",
        "[a-z ]{0,12}",
    ]
}

fn columns_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
    prop::collection::btree_map(
        "[A-Za-z_ ]{1,10}",
        prop::collection::vec(value_strategy(), 0..7),
        0..6,
    )
}

fn fields_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    // Trimmed, non-blank names so every generated field survives layout cleanup.
    prop::collection::btree_map(
        "[A-Za-z]([A-Za-z ]{0,10}[A-Za-z])?",
        "[0-9a-z]{0,3}",
        0..6,
    )
}

fn table_from(columns: &[(String, Vec<String>)]) -> InMemoryTable {
    columns
        .iter()
        .fold(InMemoryTable::new(), |table, (name, values)| {
            table.with_values(name.clone(), values.iter().cloned())
        })
}

fn layout_from(fields: &[(String, String)]) -> TargetLayout {
    TargetLayout::from_names(fields.iter().map(|(n, e)| (n.as_str(), e.as_str())))
}

proptest! {
    #[test]
    fn every_entry_clears_threshold(
        fields in fields_strategy(),
        columns in columns_strategy(),
        threshold in 0.0f64..1.45,
    ) {
        let fields: Vec<_> = fields.into_iter().collect();
        let columns: Vec<_> = columns.into_iter().collect();
        let suggestions = suggest_mapping(&layout_from(&fields), &table_from(&columns), threshold);
        for entry in &suggestions {
            prop_assert!(entry.raw_score >= threshold);
        }
    }

    #[test]
    fn winner_has_the_maximum_score(
        fields in fields_strategy(),
        columns in columns_strategy(),
    ) {
        let fields: Vec<_> = fields.into_iter().collect();
        let columns: Vec<_> = columns.into_iter().collect();
        let layout = layout_from(&fields);
        let table = table_from(&columns);
        let engine = MappingEngine::new(EngineOptions::default());
        let suggestions = engine.suggest(&layout, &table);

        for field in layout.iter() {
            let scores = engine.score_all_for_field(field, &table);
            let best = scores.first().map(|(_, s)| s.total);
            match (suggestions.get(&field.name), best) {
                (Some(entry), Some(best)) => {
                    prop_assert_eq!(entry.raw_score, best);
                    // First column in table order among the tied maxima.
                    let first_max = scores
                        .iter()
                        .find(|(_, s)| s.total == best)
                        .map(|(name, _)| name.clone());
                    prop_assert_eq!(Some(entry.source_column.clone()), first_max);
                }
                (None, Some(best)) => prop_assert!(best < engine.threshold()),
                (Some(_), None) => prop_assert!(false, "suggestion without columns"),
                (None, None) => {}
            }
        }
    }

    #[test]
    fn repeated_calls_are_identical(
        fields in fields_strategy(),
        columns in columns_strategy(),
    ) {
        let fields: Vec<_> = fields.into_iter().collect();
        let columns: Vec<_> = columns.into_iter().collect();
        let layout = layout_from(&fields);
        let table = table_from(&columns);
        let first = serde_json::to_string(&suggest_mapping(&layout, &table, 0.6)).unwrap();
        let second = serde_json::to_string(&suggest_mapping(&layout, &table, 0.6)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn field_order_does_not_matter(
        fields in fields_strategy(),
        columns in columns_strategy(),
    ) {
        let mut fields: Vec<_> = fields.into_iter().collect();
        let columns: Vec<_> = columns.into_iter().collect();
        let table = table_from(&columns);
        let forward = suggest_mapping(&layout_from(&fields), &table, 0.6);
        fields.reverse();
        let backward = suggest_mapping(&layout_from(&fields), &table, 0.6);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn column_order_only_affects_ties(
        fields in fields_strategy(),
        columns in columns_strategy(),
    ) {
        let fields: Vec<_> = fields.into_iter().collect();
        let mut columns: Vec<_> = columns.into_iter().collect();
        let layout = layout_from(&fields);
        let engine = MappingEngine::new(EngineOptions::default());

        let forward_table = table_from(&columns);
        let forward = engine.suggest(&layout, &forward_table);
        columns.reverse();
        let backward = engine.suggest(&layout, &table_from(&columns));

        for field in layout.iter() {
            let scores = engine.score_all_for_field(field, &forward_table);
            let unique_max = match scores.as_slice() {
                [_] => true,
                [first, second, ..] => first.1.total > second.1.total,
                [] => false,
            };
            if unique_max {
                prop_assert_eq!(forward.get(&field.name), backward.get(&field.name));
            }
        }
    }
}

#[test]
fn empty_table_is_empty_for_any_threshold() {
    let layout = TargetLayout::from_names([("NPI", ""), ("Zip", "")]);
    for threshold in [-1.0, 0.0, 0.6, 2.0] {
        assert!(suggest_mapping(&layout, &InMemoryTable::new(), threshold).is_empty());
    }
}
