use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicationStatus, Pet, Shelter, ShelterId, ShelterSummary};
use super::pets;
use super::repository::{AdoptionRepository, RepositoryError};
use super::service::AdoptionServiceError;
use super::validation::{validate_pet, validate_shelter, PetSubmission, ShelterSubmission};

/// Sort orders offered by the shelter listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelterOrder {
    #[default]
    NameDesc,
    PetCount,
    Recent,
}

/// Pet counts and ages for a single shelter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelterStats {
    pub pet_count: usize,
    pub adoptable_pets_count: usize,
    pub pets_adopted: usize,
    pub average_pet_age: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelterProfile {
    #[serde(flatten)]
    pub shelter: Shelter,
    #[serde(flatten)]
    pub stats: ShelterStats,
}

/// Admin overview of every shelter and the ones awaiting a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub shelters: Vec<Shelter>,
    pub pending_app_shelters: Vec<Shelter>,
}

/// Shelter and pet management plus the listing queries built on top of them.
pub struct ShelterDirectory<R> {
    repository: Arc<R>,
}

impl<R> ShelterDirectory<R>
where
    R: AdoptionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_shelter(
        &self,
        submission: ShelterSubmission,
    ) -> Result<Shelter, AdoptionServiceError> {
        let shelter = validate_shelter(submission)?;
        let stored = self.repository.insert_shelter(shelter)?;
        info!(shelter_id = %stored.id, name = %stored.name, "shelter created");
        Ok(stored)
    }

    pub fn create_pet(
        &self,
        shelter_id: ShelterId,
        submission: PetSubmission,
    ) -> Result<Pet, AdoptionServiceError> {
        let shelter = self.get(shelter_id)?;
        let pet = validate_pet(submission)?;
        let stored = self.repository.insert_pet(shelter.id, pet)?;
        info!(shelter_id = %shelter.id, pet_id = %stored.id, "pet listed");
        Ok(stored)
    }

    /// Deletes the shelter and, with it, every pet it owns.
    pub fn delete_shelter(&self, id: ShelterId) -> Result<(), AdoptionServiceError> {
        self.repository.delete_shelter(id)?;
        info!(shelter_id = %id, "shelter deleted");
        Ok(())
    }

    pub fn get(&self, id: ShelterId) -> Result<Shelter, AdoptionServiceError> {
        let shelter = self
            .repository
            .fetch_shelter(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(shelter)
    }

    pub fn reverse_alpha_shelters(&self) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let mut shelters = self.repository.shelters()?;
        shelters.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(shelters)
    }

    /// Shelters owning at least one pet on a pending application, by name.
    pub fn pending_app_shelters(&self) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let pending: BTreeSet<_> = self
            .repository
            .applications()?
            .into_iter()
            .filter(|application| application.status == ApplicationStatus::Pending)
            .map(|application| application.id)
            .collect();

        let requested_pets: BTreeSet<_> = self
            .repository
            .application_pets()?
            .into_iter()
            .filter(|link| pending.contains(&link.application_id))
            .map(|link| link.pet_id)
            .collect();

        let shelter_ids: BTreeSet<_> = self
            .repository
            .pets()?
            .into_iter()
            .filter(|pet| requested_pets.contains(&pet.id))
            .map(|pet| pet.shelter_id)
            .collect();

        let mut shelters: Vec<_> = self
            .repository
            .shelters()?
            .into_iter()
            .filter(|shelter| shelter_ids.contains(&shelter.id))
            .collect();
        shelters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shelters)
    }

    pub fn order_by_number_of_pets(&self) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let mut counts: HashMap<ShelterId, usize> = HashMap::new();
        for pet in self.repository.pets()? {
            *counts.entry(pet.shelter_id).or_default() += 1;
        }

        let mut shelters = self.repository.shelters()?;
        shelters.sort_by_key(|shelter| Reverse(counts.get(&shelter.id).copied().unwrap_or(0)));
        Ok(shelters)
    }

    pub fn order_by_recently_created(&self) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let mut shelters = self.repository.shelters()?;
        shelters.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(shelters)
    }

    /// Case-insensitive partial match on the shelter name.
    pub fn search(&self, query: &str) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let needle = query.trim().to_lowercase();
        let shelters = self.repository.shelters()?;
        if needle.is_empty() {
            return Ok(shelters);
        }
        Ok(shelters
            .into_iter()
            .filter(|shelter| shelter.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn find_name_and_address(
        &self,
        id: ShelterId,
    ) -> Result<ShelterSummary, AdoptionServiceError> {
        let shelter = self.get(id)?;
        Ok(ShelterSummary::from(&shelter))
    }

    pub fn list(
        &self,
        order: ShelterOrder,
        search: Option<&str>,
    ) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let ordered = match order {
            ShelterOrder::NameDesc => self.reverse_alpha_shelters()?,
            ShelterOrder::PetCount => self.order_by_number_of_pets()?,
            ShelterOrder::Recent => self.order_by_recently_created()?,
        };

        let Some(query) = search else {
            return Ok(ordered);
        };
        let matching: BTreeSet<_> = self
            .search(query)?
            .into_iter()
            .map(|shelter| shelter.id)
            .collect();
        Ok(ordered
            .into_iter()
            .filter(|shelter| matching.contains(&shelter.id))
            .collect())
    }

    pub fn admin_dashboard(&self) -> Result<AdminDashboard, AdoptionServiceError> {
        Ok(AdminDashboard {
            shelters: self.reverse_alpha_shelters()?,
            pending_app_shelters: self.pending_app_shelters()?,
        })
    }

    pub fn pet_count(&self, shelter: &Shelter) -> Result<usize, AdoptionServiceError> {
        Ok(self.repository.pets_for_shelter(shelter.id)?.len())
    }

    pub fn adoptable_pets(&self, shelter: &Shelter) -> Result<Vec<Pet>, AdoptionServiceError> {
        Ok(pets::adoptable(self.repository.pets_for_shelter(shelter.id)?))
    }

    pub fn adoptable_pets_count(&self, shelter: &Shelter) -> Result<usize, AdoptionServiceError> {
        Ok(self.adoptable_pets(shelter)?.len())
    }

    pub fn pets_adopted(&self, shelter: &Shelter) -> Result<usize, AdoptionServiceError> {
        Ok(self
            .repository
            .pets_for_shelter(shelter.id)?
            .iter()
            .filter(|pet| !pet.adoptable)
            .count())
    }

    pub fn alphabetical_pets(&self, shelter: &Shelter) -> Result<Vec<Pet>, AdoptionServiceError> {
        Ok(pets::alphabetical(self.adoptable_pets(shelter)?))
    }

    pub fn shelter_pets_filtered_by_age(
        &self,
        shelter: &Shelter,
        minimum_age: u32,
    ) -> Result<Vec<Pet>, AdoptionServiceError> {
        Ok(pets::at_least_age(self.adoptable_pets(shelter)?, minimum_age))
    }

    pub fn average_pet_age(&self, shelter: &Shelter) -> Result<Option<f64>, AdoptionServiceError> {
        Ok(pets::average_age(
            &self.repository.pets_for_shelter(shelter.id)?,
        ))
    }

    pub fn stats(&self, shelter: &Shelter) -> Result<ShelterStats, AdoptionServiceError> {
        let all = self.repository.pets_for_shelter(shelter.id)?;
        let adoptable = all.iter().filter(|pet| pet.adoptable).count();
        Ok(ShelterStats {
            pet_count: all.len(),
            adoptable_pets_count: adoptable,
            pets_adopted: all.len() - adoptable,
            average_pet_age: pets::average_age(&all),
        })
    }

    pub fn profile(&self, id: ShelterId) -> Result<ShelterProfile, AdoptionServiceError> {
        let shelter = self.get(id)?;
        let stats = self.stats(&shelter)?;
        Ok(ShelterProfile { shelter, stats })
    }
}
