use std::collections::HashSet;
use std::num::NonZeroUsize;

use proptest::prelude::*;
use reefdesk_core::text::normalize_term;
use reefdesk_core::{CategoryFilter, QueryState, Record, RecordId, SortValue};
use reefdesk_view::profiles::dive_sites;
use reefdesk_view::{matches, CollectionView};

const NAMES: [&str; 8] = ["Alpha", "alpha", "Álpha", "Beta", "Coral Reef", "reef wall", "Zeta", ""];
const LEVELS: [&str; 4] = ["beginner", "intermediate", "advanced", "technical"];
const TERMS: [&str; 6] = ["", "a", "REEF", "  wall ", "zz", "alp"];
const FILTERS: [&str; 5] = ["all", "beginner", "advanced", "technical", "nope"];
const MODES: [&str; 5] = ["name", "difficulty", "depth", "featured", "bogus"];

fn arb_collection() -> impl Strategy<Value = Vec<Record>> {
    let row = (
        prop::sample::select(NAMES.to_vec()),
        prop::option::of(prop::sample::select(LEVELS.to_vec())),
        any::<bool>(),
        prop::option::of(prop_oneof![Just(f64::NAN), (0u32..40).prop_map(f64::from)]),
    );
    prop::collection::vec(row, 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, level, featured, depth))| {
                // Scrambled but unique ids so id order differs from input order.
                let id = (i64::try_from(i).unwrap() * 7919) % 10007;
                let mut record = Record::new(id, name).with_featured(featured);
                if let Some(level) = level {
                    record = record.with_category(level);
                }
                if let Some(depth) = depth {
                    record = record.with_sort_key("depth", SortValue::Number(depth));
                }
                record
            })
            .collect()
    })
}

fn arb_query() -> impl Strategy<Value = QueryState> {
    (
        prop::sample::select(TERMS.to_vec()),
        prop::sample::select(FILTERS.to_vec()),
        prop::sample::select(MODES.to_vec()),
        -3i64..12,
        1usize..6,
    )
        .prop_map(|(term, filter, mode, page, size)| {
            QueryState::new(NonZeroUsize::new(size).unwrap(), mode)
                .with_search(term)
                .with_category(CategoryFilter::parse(filter))
                .with_page(page)
        })
}

fn view() -> CollectionView {
    dive_sites().collection_view()
}

fn ids(records: &[&Record]) -> Vec<RecordId> {
    records.iter().map(|r| r.id.clone()).collect()
}

proptest! {
    #[test]
    fn filtered_is_exactly_the_matching_subset(collection in arb_collection(), query in arb_query()) {
        let view = view();
        let result = view.compute(&collection, &query);
        let term = normalize_term(&query.search_term);

        for record in result.filtered_sorted() {
            prop_assert!(matches(record, &term, &query.category));
        }
        let expected: HashSet<RecordId> = collection
            .iter()
            .filter(|r| matches(r, &term, &query.category))
            .map(|r| r.id.clone())
            .collect();
        let got = ids(result.filtered_sorted());
        prop_assert_eq!(got.len(), expected.len(), "no duplicates, no omissions");
        prop_assert_eq!(got.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn repeated_runs_order_identically(collection in arb_collection(), query in arb_query()) {
        let view = view();
        let a = ids(view.compute(&collection, &query).filtered_sorted());
        let b = ids(view.compute(&collection, &query).filtered_sorted());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn known_modes_ignore_input_order(collection in arb_collection(), query in arb_query()) {
        prop_assume!(query.sort_mode != "bogus");
        let view = view();
        let mut reversed = collection.clone();
        reversed.reverse();
        let a = ids(view.compute(&collection, &query).filtered_sorted());
        let b = ids(view.compute(&reversed, &query).filtered_sorted());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pages_concatenate_to_the_full_sequence(collection in arb_collection(), query in arb_query()) {
        let view = view();
        let full = view.compute(&collection, &query);
        let size = query.page_size.get();
        let mut stitched = Vec::new();
        for page in 1..=full.total_pages() {
            let paged = view.compute(&collection, &query.clone().with_page(i64::try_from(page).unwrap()));
            prop_assert_eq!(paged.page(), page);
            prop_assert!(paged.page_items().len() <= size);
            if page < full.total_pages() {
                prop_assert_eq!(paged.page_items().len(), size);
            }
            stitched.extend(ids(paged.page_items()));
        }
        prop_assert_eq!(stitched, ids(full.filtered_sorted()));
    }

    #[test]
    fn empty_results_have_no_pages(page in any::<i64>(), size in 1usize..50) {
        let query = QueryState::new(NonZeroUsize::new(size).unwrap(), "name").with_page(page);
        let result = view().compute(&[], &query);
        prop_assert_eq!(result.total_pages(), 0);
        prop_assert_eq!(result.total_count(), 0);
        prop_assert!(result.page_items().is_empty());
    }

    #[test]
    fn search_always_lands_on_page_one(
        collection in arb_collection(),
        term in prop::sample::select(TERMS.to_vec()),
    ) {
        let mut controller = dive_sites().controller();
        let _ = controller.set_collection(collection);
        let _ = controller.set_page(3);
        let shown = controller.set_search_term(term).page();
        prop_assert_eq!(shown, 1);
        prop_assert_eq!(controller.query().page, 1);
    }
}
