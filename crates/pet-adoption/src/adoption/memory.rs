use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    Application, ApplicationId, ApplicationPet, ApplicationPetId, ApplicationPetStatus,
    NewApplication, NewPet, NewShelter, Pet, PetId, Shelter, ShelterId,
};
use super::repository::{AdoptionRepository, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    shelters: BTreeMap<ShelterId, Shelter>,
    pets: BTreeMap<PetId, Pet>,
    applications: BTreeMap<ApplicationId, Application>,
    application_pets: BTreeMap<ApplicationPetId, ApplicationPet>,
    shelter_seq: u64,
    pet_seq: u64,
    application_seq: u64,
    application_pet_seq: u64,
}

fn next_id(sequence: &mut u64) -> u64 {
    *sequence += 1;
    *sequence
}

/// Process-local store used by the API service, the CLI report, and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAdoptionRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAdoptionRepository {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("repository mutex poisoned")
    }
}

impl AdoptionRepository for InMemoryAdoptionRepository {
    fn insert_shelter(&self, shelter: NewShelter) -> Result<Shelter, RepositoryError> {
        let mut tables = self.lock();
        let id = ShelterId(next_id(&mut tables.shelter_seq));
        let record = Shelter {
            id,
            name: shelter.name,
            city: shelter.city,
            rank: shelter.rank,
            foster_program: shelter.foster_program,
            created_at: Utc::now(),
        };
        tables.shelters.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_shelter(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        Ok(self.lock().shelters.get(&id).cloned())
    }

    fn shelters(&self) -> Result<Vec<Shelter>, RepositoryError> {
        Ok(self.lock().shelters.values().cloned().collect())
    }

    fn delete_shelter(&self, id: ShelterId) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        if tables.shelters.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let orphaned: Vec<PetId> = tables
            .pets
            .values()
            .filter(|pet| pet.shelter_id == id)
            .map(|pet| pet.id)
            .collect();
        for pet_id in &orphaned {
            tables.pets.remove(pet_id);
        }
        tables
            .application_pets
            .retain(|_, link| !orphaned.contains(&link.pet_id));
        Ok(())
    }

    fn insert_pet(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, RepositoryError> {
        let mut tables = self.lock();
        if !tables.shelters.contains_key(&shelter_id) {
            return Err(RepositoryError::NotFound);
        }
        let id = PetId(next_id(&mut tables.pet_seq));
        let record = Pet {
            id,
            shelter_id,
            name: pet.name,
            breed: pet.breed,
            age: pet.age,
            adoptable: pet.adoptable,
            created_at: Utc::now(),
        };
        tables.pets.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self.lock().pets.get(&id).cloned())
    }

    fn update_pet(&self, pet: Pet) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        match tables.pets.get_mut(&pet.id) {
            Some(existing) => {
                *existing = pet;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self.lock().pets.values().cloned().collect())
    }

    fn pets_for_shelter(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self
            .lock()
            .pets
            .values()
            .filter(|pet| pet.shelter_id == shelter_id)
            .cloned()
            .collect())
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock();
        let id = ApplicationId(next_id(&mut tables.application_seq));
        let record = Application {
            id,
            name: application.name,
            street_address: application.street_address,
            city: application.city,
            state: application.state,
            zip_code: application.zip_code,
            description: application.description,
            status: application.status,
            created_at: Utc::now(),
        };
        tables.applications.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock().applications.get(&id).cloned())
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        match tables.applications.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.lock().applications.values().cloned().collect())
    }

    fn link_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationPet, RepositoryError> {
        let mut tables = self.lock();
        if !tables.applications.contains_key(&application_id) || !tables.pets.contains_key(&pet_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = tables
            .application_pets
            .values()
            .any(|link| link.application_id == application_id && link.pet_id == pet_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let id = ApplicationPetId(next_id(&mut tables.application_pet_seq));
        let link = ApplicationPet {
            id,
            application_id,
            pet_id,
            status: ApplicationPetStatus::Pending,
        };
        tables.application_pets.insert(id, link.clone());
        Ok(link)
    }

    fn fetch_application_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<Option<ApplicationPet>, RepositoryError> {
        Ok(self
            .lock()
            .application_pets
            .values()
            .find(|link| link.application_id == application_id && link.pet_id == pet_id)
            .cloned())
    }

    fn update_application_pet(&self, link: ApplicationPet) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        match tables.application_pets.get_mut(&link.id) {
            Some(existing) => {
                *existing = link;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn application_pets(&self) -> Result<Vec<ApplicationPet>, RepositoryError> {
        Ok(self.lock().application_pets.values().cloned().collect())
    }

    fn application_pets_for(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationPet>, RepositoryError> {
        Ok(self
            .lock()
            .application_pets
            .values()
            .filter(|link| link.application_id == application_id)
            .cloned()
            .collect())
    }
}
