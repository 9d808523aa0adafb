use std::num::NonZeroUsize;

use reefdesk_core::{normalize_collection, CategoryFilter, CategorySet, QueryState, Record, SortValue};
use reefdesk_view::profiles::{bookings, certifications, dive_sites, testimonials, videos};
use reefdesk_view::{
    builtin_profiles, compute_result_view, CollectionView, Comparator, RankSource, SortSpec, SortTable,
};
use serde_json::json;

fn names<'a>(records: &[&'a Record]) -> Vec<&'a str> {
    records.iter().map(|r| r.display_name.as_str()).collect()
}

fn dive_view() -> CollectionView {
    let difficulty = ["beginner", "intermediate", "advanced"];
    CollectionView::new(
        CategorySet::new(difficulty),
        SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("difficulty", SortSpec::ascending(Comparator::rank(RankSource::Category, difficulty)))
            .mode("depth", SortSpec::ascending(Comparator::Numeric("depth".into())))
            .mode("featured", SortSpec::ascending(Comparator::Featured)),
    )
}

fn query(page_size: usize) -> QueryState {
    QueryState::new(NonZeroUsize::new(page_size).unwrap(), "name")
}

fn five_sites() -> Vec<Record> {
    let rows = [
        ("Zeta", "beginner"),
        ("Alpha", "beginner"),
        ("Mid", "intermediate"),
        ("Deep", "advanced"),
        ("Beta", "beginner"),
    ];
    rows.iter()
        .zip(1i64..)
        .map(|((name, level), id)| Record::new(id, *name).with_category(level))
        .collect()
}

#[test]
fn beginner_sites_by_name_two_per_page() {
    let sites = five_sites();
    let view = dive_view();
    let q = query(2).with_category(CategoryFilter::parse("beginner"));

    let first = compute_result_view(&view, &sites, &q);
    assert_eq!(names(first.filtered_sorted()), ["Alpha", "Beta", "Zeta"]);
    assert_eq!(names(first.page_items()), ["Alpha", "Beta"]);
    assert_eq!(first.total_count(), 3);
    assert_eq!(first.total_pages(), 2);

    let second = compute_result_view(&view, &sites, &q.clone().with_page(2));
    assert_eq!(names(second.page_items()), ["Zeta"]);
    assert!(!second.has_next());
    assert!(second.has_previous());
}

#[test]
fn featured_first_then_id_within_group() {
    let items: Vec<Record> = [("A", false), ("B", true), ("C", false), ("D", true)]
        .iter()
        .map(|(id, featured)| Record::new(*id, *id).with_featured(*featured))
        .collect();
    let view = dive_view();

    let result = view.compute(&items, &query(10).with_sort("featured"));
    assert_eq!(names(result.filtered_sorted()), ["B", "D", "A", "C"]);
    assert_eq!(result.summary().featured, 2);
}

#[test]
fn name_ties_break_on_id_regardless_of_input_order() {
    let forward = vec![Record::new(3, "Reef"), Record::new(1, "Reef"), Record::new(2, "reef")];
    let mut backward = forward.clone();
    backward.reverse();
    let view = dive_view();
    let q = query(10);

    let ids = |records: &[Record]| -> Vec<String> {
        view.compute(records, &q).filtered_sorted().iter().map(|r| r.id.to_string()).collect()
    };
    assert_eq!(ids(&forward), ids(&backward));
    assert_eq!(ids(&forward), ["2", "1", "3"], "lowercase collates before uppercase");
}

#[test]
fn negative_zero_depth_ties_break_on_id() {
    let sites = vec![
        Record::new(2, "Flat").with_sort_key("depth", SortValue::Number(-0.0)),
        Record::new(1, "Shelf").with_sort_key("depth", SortValue::Number(0.0)),
    ];
    let result = dive_view().compute(&sites, &query(10).with_sort("depth"));
    let ids: Vec<String> = result.filtered_sorted().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[test]
fn difficulty_rank_puts_unknown_levels_last() {
    let sites = vec![
        Record::new(1, "Wall").with_category("advanced"),
        Record::new(2, "Mystery"),
        Record::new(3, "Lagoon").with_category("beginner"),
        Record::new(4, "Tech").with_category("technical"),
        Record::new(5, "Drift").with_category("intermediate"),
    ];
    let result = dive_view().compute(&sites, &query(10).with_sort("difficulty"));
    assert_eq!(names(result.filtered_sorted()), ["Lagoon", "Drift", "Wall", "Mystery", "Tech"]);
}

#[test]
fn numeric_sort_puts_nan_and_missing_last() {
    let sites = vec![
        Record::new(1, "Shallow").with_sort_key("depth", SortValue::Number(8.0)),
        Record::new(2, "Unknown"),
        Record::new(3, "Broken").with_sort_key("depth", SortValue::Number(f64::NAN)),
        Record::new(4, "Deep").with_sort_key("depth", SortValue::Number(40.0)),
        Record::new(5, "Mid").with_sort_key("depth", SortValue::Number(18.5)),
    ];
    let result = dive_view().compute(&sites, &query(10).with_sort("depth"));
    assert_eq!(names(result.filtered_sorted()), ["Shallow", "Mid", "Deep", "Unknown", "Broken"]);
}

#[test]
fn unknown_sort_mode_preserves_input_order() {
    let sites = five_sites();
    let result = dive_view().compute(&sites, &query(10).with_sort("popularity"));
    assert_eq!(names(result.filtered_sorted()), ["Zeta", "Alpha", "Mid", "Deep", "Beta"]);
}

#[test]
fn search_is_trimmed_and_case_insensitive() {
    let sites = vec![
        Record::new(1, "Blue Hole").with_search_text(&["Blue Hole", "Dahab", "arch"]),
        Record::new(2, "Canyon").with_search_text(&["Canyon", "Dahab"]),
        Record::new(3, "Thistlegorm").with_search_text(&["Thistlegorm", "Ras Mohammed", "wreck"]),
    ];
    let view = dive_view();

    let dahab = view.compute(&sites, &query(10).with_search("  DAHAB "));
    assert_eq!(names(dahab.filtered_sorted()), ["Blue Hole", "Canyon"]);

    let none = view.compute(&sites, &query(10).with_search("manta"));
    assert!(none.is_empty());
    assert_eq!(none.total_pages(), 0);
    assert!(none.page_items().is_empty());
}

#[test]
fn summary_counts_follow_the_active_filter() {
    let sites = vec![
        Record::new(1, "Garden").with_category("beginner").with_featured(true),
        Record::new(2, "Gardens Deep").with_category("advanced"),
        Record::new(3, "Wall").with_category("advanced").with_featured(true),
    ];
    let view = dive_view();

    let all = view.compute(&sites, &query(10));
    assert_eq!(all.summary().featured, 2);
    assert_eq!(all.summary().count_for("advanced"), 2);
    assert_eq!(all.summary().count_for("intermediate"), 0);
    let keys: Vec<&str> = all.summary().by_category.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["beginner", "intermediate", "advanced"]);

    let garden = view.compute(&sites, &query(10).with_search("garden"));
    assert_eq!(garden.summary().featured, 1);
    assert_eq!(garden.summary().count_for("beginner"), 1);
    assert_eq!(garden.summary().count_for("advanced"), 1);
}

#[test]
fn out_of_range_page_shows_last_page() {
    let sites = five_sites();
    let result = dive_view().compute(&sites, &query(2).with_page(40));
    assert_eq!(result.page(), 3);
    assert_eq!(names(result.page_items()), ["Zeta"]);
}

#[test]
fn dive_site_profile_from_api_rows() {
    let profile = dive_sites();
    let rows = vec![
        json!({ "id": 11, "name": "Shark Point", "difficulty_level": "Advanced", "max_depth": "35", "is_featured": true }),
        json!({ "id": 12, "name": "Coral Garden", "difficulty_level": "beginner", "max_depth": 12, "is_featured": false }),
        json!({ "id": 13, "name": "Eel Garden", "difficulty_level": "intermediate", "max_depth": null }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let view = profile.collection_view();
    let base = profile.initial_query();

    let by_depth = view.compute(&records, &base.clone().with_sort("depth"));
    assert_eq!(names(by_depth.filtered_sorted()), ["Coral Garden", "Shark Point", "Eel Garden"]);

    let by_level = view.compute(&records, &base.clone().with_sort("difficulty"));
    assert_eq!(names(by_level.filtered_sorted()), ["Coral Garden", "Eel Garden", "Shark Point"]);

    let gardens = view.compute(&records, &base.with_search("garden"));
    assert_eq!(names(gardens.filtered_sorted()), ["Coral Garden", "Eel Garden"]);
}

#[test]
fn newest_bookings_first_with_undated_last() {
    let profile = bookings();
    let rows = vec![
        json!({ "id": 1, "guest_name": "Ana", "status": "confirmed", "created_at": "2024-05-01 09:00:00" }),
        json!({ "id": 2, "guest_name": "Ben", "status": "pending" }),
        json!({ "id": 3, "guest_name": "Cy", "status": "cancelled", "created_at": "2024-06-12T18:30:00Z" }),
        json!({ "id": 4, "guest_name": "Di", "status": "pending", "created_at": "2024-05-01 09:00:00" }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let result = profile.collection_view().compute(&records, &profile.initial_query().with_sort("newest"));
    assert_eq!(names(result.filtered_sorted()), ["Cy", "Ana", "Di", "Ben"]);

    let by_status = profile.collection_view().compute(&records, &profile.initial_query().with_sort("status"));
    assert_eq!(names(by_status.filtered_sorted()), ["Ben", "Di", "Ana", "Cy"]);
}

#[test]
fn certification_levels_rank_from_free_text() {
    let profile = certifications();
    let rows = vec![
        json!({ "id": 1, "full_name": "Kai", "certification_level": "Divemaster", "status": "approved" }),
        json!({ "id": 2, "full_name": "Lea", "certification_level": "Open Water", "status": "pending" }),
        json!({ "id": 3, "full_name": "Mo", "certification_level": "advanced-open-water", "status": "pending" }),
        json!({ "id": 4, "full_name": "Noa", "certification_level": "Freediver", "status": "rejected" }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let result = profile.collection_view().compute(&records, &profile.initial_query().with_sort("level"));
    assert_eq!(names(result.filtered_sorted()), ["Lea", "Mo", "Kai", "Noa"]);

    let pending = profile
        .collection_view()
        .compute(&records, &profile.initial_query().with_category(CategoryFilter::parse("Pending")));
    assert_eq!(pending.total_count(), 2);
}

#[test]
fn most_viewed_videos_first() {
    let profile = videos();
    let rows = vec![
        json!({ "id": 1, "title": "Night dive", "views": 120, "category": "dive_trip" }),
        json!({ "id": 2, "title": "Buoyancy basics", "views": "980", "category": "tutorial" }),
        json!({ "id": 3, "title": "Turtle season", "category": "marine_life" }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let result = profile.collection_view().compute(&records, &profile.initial_query().with_sort("views"));
    assert_eq!(names(result.filtered_sorted()), ["Buoyancy basics", "Night dive", "Turtle season"]);
}

#[test]
fn testimonials_by_rating_highest_first() {
    let profile = testimonials();
    let rows = vec![
        json!({ "id": 1, "name": "Ana", "rating": 3, "status": "approved" }),
        json!({ "id": 2, "name": "Ben", "status": "approved" }),
        json!({ "id": 3, "name": "Cy", "rating": "5", "status": "pending" }),
        json!({ "id": 4, "name": "Di", "rating": 4.5, "status": "approved" }),
        json!({ "id": 5, "name": "Eli", "rating": 5, "status": "approved" }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let result = profile.collection_view().compute(&records, &profile.initial_query().with_sort("rating"));
    assert_eq!(names(result.filtered_sorted()), ["Cy", "Eli", "Di", "Ana", "Ben"]);
}

#[test]
fn bookings_by_room_name_collate_like_names() {
    let profile = bookings();
    let rows = vec![
        json!({ "id": 1, "guest_name": "Ana", "room": { "name": "Reef Suite" } }),
        json!({ "id": 2, "guest_name": "Ben" }),
        json!({ "id": 3, "guest_name": "Cy", "room": { "name": "Écume Villa" } }),
        json!({ "id": 4, "guest_name": "Di", "room": { "name": "beach hut" } }),
    ];
    let records = normalize_collection(&rows, &profile.schema).records;
    let result = profile.collection_view().compute(&records, &profile.initial_query().with_sort("room"));
    assert_eq!(names(result.filtered_sorted()), ["Di", "Cy", "Ana", "Ben"]);
}

#[test]
fn builtin_profiles_are_well_formed() {
    for profile in builtin_profiles() {
        profile.schema.validate().unwrap_or_else(|e| panic!("{}: {e}", profile.name));
        assert!(profile.sorts.get(profile.default_sort).is_some(), "{}: default sort is not a mode", profile.name);
    }
}
