//! Fixtures shared by the Verdant benchmarks.

use verdant_core::{Category, Coordinates, LocationIndex, LocationRecord};

const CITIES: [&str; 6] = [
    "San Francisco",
    "Oakland",
    "Palo Alto",
    "San Jose",
    "San Rafael",
    "Berkeley",
];

/// An index of `n` synthetic records cycling through the Bay Area cities
/// and every category, each listing a few materials.
#[must_use]
pub fn synthetic_index(n: u32) -> LocationIndex {
    let records = (1..=n)
        .map(|i| {
            let category = Category::all()[i as usize % Category::all().len()];
            LocationRecord {
                id: i,
                name: format!("Site {i} {category}"),
                kind: "Benchmark Facility".to_string(),
                category,
                coordinates: Coordinates::new(37.0 + f64::from(i) * 1e-4, -122.0),
                address: format!("{i} Market Street"),
                city: CITIES[i as usize % CITIES.len()].to_string(),
                state: "CA".to_string(),
                zip: "94000".to_string(),
                website: None,
                phone: None,
                materials: Some(vec![
                    "Food scraps".to_string(),
                    "Yard waste".to_string(),
                    format!("Material {i}"),
                ]),
                workshops: None,
                produce: None,
                description: String::new(),
            }
        })
        .collect();
    LocationIndex::from_records(records).unwrap_or_default()
}
