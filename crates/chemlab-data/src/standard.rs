//! The built-in lab content, compiled into the binary.

use crate::loader::{DataLoadError, Format, catalog_from_data, deserialize_str};
use crate::schema::CatalogData;
use chemlab_core::badge::BadgeRule;
use chemlab_core::catalog::Catalog;
use chemlab_core::progress::Lesson;
use std::path::Path;

const STANDARD_CATALOG: &str = include_str!("../assets/standard_catalog.ron");
const STANDARD_LESSONS: &str = include_str!("../assets/lessons.ron");
const STANDARD_BADGES: &str = include_str!("../assets/badges.ron");

/// Four elements, eight compounds and twelve reactions.
pub fn standard_catalog() -> Result<Catalog, DataLoadError> {
    let data: CatalogData = deserialize_str(
        STANDARD_CATALOG,
        Format::Ron,
        Path::new("standard_catalog.ron"),
    )?;
    catalog_from_data(&data)
}

pub fn standard_lessons() -> Result<Vec<Lesson>, DataLoadError> {
    deserialize_str(STANDARD_LESSONS, Format::Ron, Path::new("lessons.ron"))
}

pub fn standard_badge_rules() -> Result<Vec<BadgeRule>, DataLoadError> {
    deserialize_str(STANDARD_BADGES, Format::Ron, Path::new("badges.ron"))
}
