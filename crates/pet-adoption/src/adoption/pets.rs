//! Row-level filters shared by the shelter and application queries.

use super::domain::Pet;

pub fn adoptable(pets: impl IntoIterator<Item = Pet>) -> Vec<Pet> {
    pets.into_iter().filter(|pet| pet.adoptable).collect()
}

/// Adoptable pets whose name contains `query`, ignoring case. A blank query matches nothing.
pub fn search(pets: impl IntoIterator<Item = Pet>, query: Option<&str>) -> Vec<Pet> {
    let needle = match query.map(str::trim).filter(|query| !query.is_empty()) {
        Some(query) => query.to_lowercase(),
        None => return Vec::new(),
    };

    pets.into_iter()
        .filter(|pet| pet.adoptable && pet.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn alphabetical(mut pets: Vec<Pet>) -> Vec<Pet> {
    pets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    pets
}

pub fn at_least_age(pets: impl IntoIterator<Item = Pet>, minimum_age: u32) -> Vec<Pet> {
    pets.into_iter().filter(|pet| pet.age >= minimum_age).collect()
}

/// Mean age rounded to two decimal places, or `None` when there are no pets.
pub fn average_age(pets: &[Pet]) -> Option<f64> {
    if pets.is_empty() {
        return None;
    }
    let total: u64 = pets.iter().map(|pet| u64::from(pet.age)).sum();
    let mean = total as f64 / pets.len() as f64;
    Some(round_to_hundredths(mean))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
