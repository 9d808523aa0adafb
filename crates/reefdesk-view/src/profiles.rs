//! List views of the resort site and dashboard.
//!
//! A profile bundles the backend endpoint, the JSON field mapping, the
//! category enumeration and the comparator table for one list page.

use std::num::NonZeroUsize;

use reefdesk_core::{CategorySet, Error, KeyKind, QueryState, RecordSchema};

use crate::controller::QueryController;
use crate::pipeline::CollectionView;
use crate::sort::{Comparator, RankSource, SortSpec, SortTable};

#[derive(Debug, Clone)]
pub struct ViewProfile {
    pub name: &'static str,
    pub title: &'static str,
    pub endpoint: &'static str,
    pub schema: RecordSchema,
    pub categories: CategorySet,
    pub sorts: SortTable,
    pub default_sort: &'static str,
    pub page_size: NonZeroUsize,
}

impl ViewProfile {
    #[must_use]
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn collection_view(&self) -> CollectionView {
        CollectionView::new(self.categories.clone(), self.sorts.clone())
    }

    #[must_use]
    pub fn initial_query(&self) -> QueryState {
        QueryState::new(self.page_size, self.default_sort)
    }

    #[must_use]
    pub fn controller(&self) -> QueryController {
        QueryController::new(self.collection_view(), self.initial_query())
    }
}

pub const PROFILE_NAMES: [&str; 5] = ["dive-sites", "bookings", "certifications", "videos", "testimonials"];

pub fn profile(name: &str) -> Result<ViewProfile, Error> {
    match name {
        "dive-sites" => Ok(dive_sites()),
        "bookings" => Ok(bookings()),
        "certifications" => Ok(certifications()),
        "videos" => Ok(videos()),
        "testimonials" => Ok(testimonials()),
        other => Err(Error::UnknownProfile(other.to_string())),
    }
}

#[must_use]
pub fn builtin_profiles() -> Vec<ViewProfile> {
    vec![dive_sites(), bookings(), certifications(), videos(), testimonials()]
}

fn page_size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(reefdesk_core::DEFAULT_PAGE_SIZE)
}

#[must_use]
pub fn dive_sites() -> ViewProfile {
    let difficulty = ["beginner", "intermediate", "advanced"];
    ViewProfile {
        name: "dive-sites",
        title: "Dive Sites",
        endpoint: "dive-sites",
        schema: RecordSchema::new("name")
            .search(["name", "location", "description", "marine_life"])
            .category("difficulty_level")
            .featured("is_featured")
            .sort("depth", "max_depth", KeyKind::Number),
        categories: CategorySet::new(difficulty),
        sorts: SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("difficulty", SortSpec::ascending(Comparator::rank(RankSource::Category, difficulty)))
            .mode("depth", SortSpec::ascending(Comparator::Numeric("depth".into())))
            .mode("featured", SortSpec::ascending(Comparator::Featured)),
        default_sort: "name",
        page_size: page_size(9),
    }
}

#[must_use]
pub fn bookings() -> ViewProfile {
    let status = ["pending", "confirmed", "completed", "cancelled"];
    ViewProfile {
        name: "bookings",
        title: "Room Bookings",
        endpoint: "bookings",
        schema: RecordSchema::new("guest_name")
            .search(["guest_name", "guest_email", "booking_reference", "room.name"])
            .category("status")
            .sort("room", "room.name", KeyKind::Text)
            .sort("check_in", "check_in_date", KeyKind::Date)
            .sort("price", "total_price", KeyKind::Number)
            .sort("created", "created_at", KeyKind::Date),
        categories: CategorySet::new(status),
        sorts: SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("room", SortSpec::ascending(Comparator::Text("room".into())))
            .mode("check_in", SortSpec::ascending(Comparator::Date("check_in".into())))
            .mode("price", SortSpec::ascending(Comparator::Numeric("price".into())))
            .mode("status", SortSpec::ascending(Comparator::rank(RankSource::Category, status)))
            .mode("newest", SortSpec::descending(Comparator::Date("created".into()))),
        default_sort: "check_in",
        page_size: page_size(10),
    }
}

#[must_use]
pub fn certifications() -> ViewProfile {
    let status = ["pending", "approved", "rejected"];
    let levels = ["open_water", "advanced_open_water", "rescue_diver", "divemaster", "instructor"];
    ViewProfile {
        name: "certifications",
        title: "Certification Applications",
        endpoint: "certifications",
        schema: RecordSchema::new("full_name")
            .search(["full_name", "email", "certification_level", "padi_number"])
            .category("status")
            .sort("level", "certification_level", KeyKind::Text)
            .sort("submitted", "created_at", KeyKind::Date),
        categories: CategorySet::new(status),
        sorts: SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("level", SortSpec::ascending(Comparator::rank(RankSource::SortKey("level".into()), levels)))
            .mode("status", SortSpec::ascending(Comparator::rank(RankSource::Category, status)))
            .mode("submitted", SortSpec::descending(Comparator::Date("submitted".into()))),
        default_sort: "submitted",
        page_size: page_size(10),
    }
}

#[must_use]
pub fn videos() -> ViewProfile {
    ViewProfile {
        name: "videos",
        title: "Video Blog",
        endpoint: "videos",
        schema: RecordSchema::new("title")
            .search(["title", "description", "category", "tags"])
            .category("category")
            .featured("is_featured")
            .sort("published", "published_at", KeyKind::Date)
            .sort("views", "views", KeyKind::Number),
        categories: CategorySet::new(["tutorial", "dive_trip", "marine_life", "resort"]),
        sorts: SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("newest", SortSpec::descending(Comparator::Date("published".into())))
            .mode("views", SortSpec::descending(Comparator::Numeric("views".into())))
            .mode("featured", SortSpec::ascending(Comparator::Featured)),
        default_sort: "newest",
        page_size: page_size(6),
    }
}

#[must_use]
pub fn testimonials() -> ViewProfile {
    ViewProfile {
        name: "testimonials",
        title: "Testimonials",
        endpoint: "testimonials",
        schema: RecordSchema::new("name")
            .search(["name", "content", "location"])
            .category("status")
            .featured("is_featured")
            .sort("rating", "rating", KeyKind::Number)
            .sort("created", "created_at", KeyKind::Date),
        categories: CategorySet::new(["pending", "approved"]),
        sorts: SortTable::new()
            .mode("name", SortSpec::ascending(Comparator::Name))
            .mode("rating", SortSpec::descending(Comparator::Numeric("rating".into())))
            .mode("newest", SortSpec::descending(Comparator::Date("created".into())))
            .mode("featured", SortSpec::ascending(Comparator::Featured)),
        default_sort: "newest",
        page_size: page_size(6),
    }
}
