//! Location Resolution Module
//!
//! Resolves raw coordinates into a display name by picking the nearest
//! entry of a built-in table of capital cities.

use haversine::{Location as HaversineLocation, Units, distance};
use tracing::debug;

use crate::models::{Location, NamedPlace};

/// Capital cities used to label arbitrary coordinates
pub const REFERENCE_PLACES: &[NamedPlace] = &[
    NamedPlace::new("London", 51.5074, -0.1278),
    NamedPlace::new("Paris", 48.8566, 2.3522),
    NamedPlace::new("Berlin", 52.5200, 13.4050),
    NamedPlace::new("Madrid", 40.4168, -3.7038),
    NamedPlace::new("Rome", 41.9028, 12.4964),
    NamedPlace::new("Amsterdam", 52.3676, 4.9041),
    NamedPlace::new("Brussels", 50.8503, 4.3517),
    NamedPlace::new("Vienna", 48.2082, 16.3738),
    NamedPlace::new("Prague", 50.0755, 14.4378),
    NamedPlace::new("Warsaw", 52.2297, 21.0122),
    NamedPlace::new("Budapest", 47.4979, 19.0402),
    NamedPlace::new("Copenhagen", 55.6761, 12.5683),
    NamedPlace::new("Stockholm", 59.3293, 18.0686),
    NamedPlace::new("Oslo", 59.9139, 10.7522),
    NamedPlace::new("Helsinki", 60.1699, 24.9384),
    NamedPlace::new("Dublin", 53.3498, -6.2603),
    NamedPlace::new("Lisbon", 38.7223, -9.1393),
    NamedPlace::new("Athens", 37.9838, 23.7275),
    NamedPlace::new("Bern", 46.9480, 7.4474),
    NamedPlace::new("Belgrade", 44.7866, 20.4489),
    NamedPlace::new("Bucharest", 44.4268, 26.1025),
    NamedPlace::new("Sofia", 42.6977, 23.3219),
    NamedPlace::new("Kyiv", 50.4501, 30.5234),
    NamedPlace::new("Vilnius", 54.6872, 25.2797),
    NamedPlace::new("Riga", 56.9496, 24.1052),
    NamedPlace::new("Tallinn", 59.4370, 24.7536),
    NamedPlace::new("Reykjavik", 64.1466, -21.9426),
    NamedPlace::new("Ankara", 39.9334, 32.8597),
    NamedPlace::new("Moscow", 55.7558, 37.6173),
    NamedPlace::new("Cairo", 30.0444, 31.2357),
    NamedPlace::new("Nairobi", -1.2921, 36.8219),
    NamedPlace::new("Pretoria", -25.7479, 28.2293),
    NamedPlace::new("New Delhi", 28.6139, 77.2090),
    NamedPlace::new("Beijing", 39.9042, 116.4074),
    NamedPlace::new("Tokyo", 35.6762, 139.6503),
    NamedPlace::new("Seoul", 37.5665, 126.9780),
    NamedPlace::new("Bangkok", 13.7563, 100.5018),
    NamedPlace::new("Singapore", 1.3521, 103.8198),
    NamedPlace::new("Canberra", -35.2809, 149.1300),
    NamedPlace::new("Wellington", -41.2865, 174.7762),
    NamedPlace::new("Washington", 38.9072, -77.0369),
    NamedPlace::new("Ottawa", 45.4215, -75.6972),
    NamedPlace::new("Mexico City", 19.4326, -99.1332),
    NamedPlace::new("Brasilia", -15.7975, -47.8919),
    NamedPlace::new("Buenos Aires", -34.6037, -58.3816),
    NamedPlace::new("Santiago", -33.4489, -70.6693),
    NamedPlace::new("Lima", -12.0464, -77.0428),
    NamedPlace::new("Bogota", 4.7110, -74.0721),
];

fn calculate_distance(latitude: f64, longitude: f64, place: &NamedPlace) -> f64 {
    let from = HaversineLocation {
        latitude,
        longitude,
    };
    let to = HaversineLocation {
        latitude: place.latitude,
        longitude: place.longitude,
    };
    distance(from, to, Units::Kilometers)
}

/// Service for labelling coordinates with a known place name
pub struct LocationResolver;

impl LocationResolver {
    /// Name of the table entry closest to the given point.
    ///
    /// Ties keep the earliest entry. Returns `None` only for an empty table.
    #[must_use]
    pub fn nearest_place<'a>(
        latitude: f64,
        longitude: f64,
        places: &'a [NamedPlace],
    ) -> Option<&'a NamedPlace> {
        let mut closest: Option<(&NamedPlace, f64)> = None;

        for place in places {
            let distance = calculate_distance(latitude, longitude, place);
            match closest {
                Some((_, smallest)) if distance >= smallest => {}
                _ => closest = Some((place, distance)),
            }
        }

        closest.map(|(place, distance)| {
            debug!(
                "Nearest place to ({:.4}, {:.4}) is {} at {:.1} km",
                latitude, longitude, place.name, distance
            );
            place
        })
    }

    /// Resolve coordinates to a location named after the nearest reference place
    #[must_use]
    pub fn resolve_coordinates(latitude: f64, longitude: f64) -> Location {
        let name = Self::nearest_place(latitude, longitude, REFERENCE_PLACES)
            .map_or_else(|| format!("{latitude:.4}, {longitude:.4}"), |place| {
                place.name.to_string()
            });
        Location::new(latitude, longitude, name)
    }
}
