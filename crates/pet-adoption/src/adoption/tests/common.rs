use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::adoption::domain::{
    Application, ApplicationId, ApplicationPet, ApplicationStatus, NewApplication, NewPet,
    NewShelter, Pet, PetId, Shelter, ShelterId,
};
use crate::adoption::repository::{AdoptionRepository, RepositoryError};
use crate::adoption::validation::ApplicationSubmission;
use crate::adoption::{
    adoption_router, AdoptionApplicationService, AdoptionState, InMemoryAdoptionRepository,
    ShelterDirectory,
};

/// The three shelters, four pets, and two pending applications used across the model tests.
pub(super) struct Fixture {
    pub(super) repository: Arc<InMemoryAdoptionRepository>,
    pub(super) directory: ShelterDirectory<InMemoryAdoptionRepository>,
    pub(super) applications: AdoptionApplicationService<InMemoryAdoptionRepository>,
    pub(super) shelter_1: Shelter,
    pub(super) shelter_2: Shelter,
    pub(super) shelter_3: Shelter,
    pub(super) pet_1: Pet,
    pub(super) pet_2: Pet,
    pub(super) pet_3: Pet,
    pub(super) pet_4: Pet,
    pub(super) application_1: Application,
    pub(super) application_2: Application,
}

pub(super) fn new_shelter(name: &str, city: &str, foster_program: bool, rank: i32) -> NewShelter {
    NewShelter {
        name: name.to_string(),
        city: city.to_string(),
        rank,
        foster_program,
    }
}

pub(super) fn new_pet(name: &str, breed: &str, age: u32, adoptable: bool) -> NewPet {
    NewPet {
        name: name.to_string(),
        breed: Some(breed.to_string()),
        age,
        adoptable,
    }
}

pub(super) fn new_application(name: &str, status: ApplicationStatus) -> NewApplication {
    NewApplication {
        name: name.to_string(),
        street_address: "123 Main St".to_string(),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        zip_code: "80202".to_string(),
        description: "I love animals!".to_string(),
        status,
    }
}

pub(super) fn application_submission() -> ApplicationSubmission {
    ApplicationSubmission {
        name: Some("John Doe".to_string()),
        street_address: Some("123 Main St".to_string()),
        city: Some("Denver".to_string()),
        state: Some("CO".to_string()),
        zip_code: Some("80202".to_string()),
        description: Some("I love dogs".to_string()),
    }
}

pub(super) fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryAdoptionRepository::default());

    let shelter_1 = repository
        .insert_shelter(new_shelter("Aurora shelter", "Aurora, CO", false, 9))
        .expect("shelter 1");
    let shelter_2 = repository
        .insert_shelter(new_shelter("RGV animal shelter", "Harlingen, TX", false, 5))
        .expect("shelter 2");
    let shelter_3 = repository
        .insert_shelter(new_shelter("Fancy pets of Colorado", "Denver, CO", true, 10))
        .expect("shelter 3");

    let pet_1 = repository
        .insert_pet(shelter_1.id, new_pet("Mr. Pirate", "tuxedo shorthair", 5, false))
        .expect("pet 1");
    let pet_2 = repository
        .insert_pet(shelter_1.id, new_pet("Clawdia", "shorthair", 3, true))
        .expect("pet 2");
    let pet_3 = repository
        .insert_pet(shelter_3.id, new_pet("Lucille Bald", "sphynx", 8, true))
        .expect("pet 3");
    let pet_4 = repository
        .insert_pet(shelter_1.id, new_pet("Ann", "ragdoll", 5, true))
        .expect("pet 4");

    let application_1 = repository
        .insert_application(new_application("John Doe", ApplicationStatus::Pending))
        .expect("application 1");
    let application_2 = repository
        .insert_application(new_application("Jane Doe", ApplicationStatus::Pending))
        .expect("application 2");

    repository
        .link_pet(application_1.id, pet_1.id)
        .expect("link 1");
    repository
        .link_pet(application_2.id, pet_3.id)
        .expect("link 2");

    Fixture {
        directory: ShelterDirectory::new(repository.clone()),
        applications: AdoptionApplicationService::new(repository.clone()),
        repository,
        shelter_1,
        shelter_2,
        shelter_3,
        pet_1,
        pet_2,
        pet_3,
        pet_4,
        application_1,
        application_2,
    }
}

pub(super) fn ids(shelters: &[Shelter]) -> Vec<ShelterId> {
    shelters.iter().map(|shelter| shelter.id).collect()
}

pub(super) fn router_for(repository: Arc<InMemoryAdoptionRepository>) -> axum::Router {
    adoption_router(AdoptionState::new(repository))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn location(response: &Response) -> String {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// Repository whose backing store is offline.
pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl AdoptionRepository for UnavailableRepository {
    fn insert_shelter(&self, _shelter: NewShelter) -> Result<Shelter, RepositoryError> {
        offline()
    }

    fn fetch_shelter(&self, _id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        offline()
    }

    fn shelters(&self) -> Result<Vec<Shelter>, RepositoryError> {
        offline()
    }

    fn delete_shelter(&self, _id: ShelterId) -> Result<(), RepositoryError> {
        offline()
    }

    fn insert_pet(&self, _shelter_id: ShelterId, _pet: NewPet) -> Result<Pet, RepositoryError> {
        offline()
    }

    fn fetch_pet(&self, _id: PetId) -> Result<Option<Pet>, RepositoryError> {
        offline()
    }

    fn update_pet(&self, _pet: Pet) -> Result<(), RepositoryError> {
        offline()
    }

    fn pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        offline()
    }

    fn pets_for_shelter(&self, _shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError> {
        offline()
    }

    fn insert_application(
        &self,
        _application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn update_application(&self, _application: Application) -> Result<(), RepositoryError> {
        offline()
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn link_pet(
        &self,
        _application_id: ApplicationId,
        _pet_id: PetId,
    ) -> Result<ApplicationPet, RepositoryError> {
        offline()
    }

    fn fetch_application_pet(
        &self,
        _application_id: ApplicationId,
        _pet_id: PetId,
    ) -> Result<Option<ApplicationPet>, RepositoryError> {
        offline()
    }

    fn update_application_pet(&self, _link: ApplicationPet) -> Result<(), RepositoryError> {
        offline()
    }

    fn application_pets(&self) -> Result<Vec<ApplicationPet>, RepositoryError> {
        offline()
    }

    fn application_pets_for(
        &self,
        _application_id: ApplicationId,
    ) -> Result<Vec<ApplicationPet>, RepositoryError> {
        offline()
    }
}

/// In-memory store where another admin's decision lands right after each
/// link update, before the service reads the links back.
pub(super) struct ConcurrentReviewRepository {
    pub(super) inner: InMemoryAdoptionRepository,
    pub(super) other_decision: Mutex<Option<ApplicationPet>>,
}

impl ConcurrentReviewRepository {
    pub(super) fn new(inner: InMemoryAdoptionRepository, other_decision: ApplicationPet) -> Self {
        Self {
            inner,
            other_decision: Mutex::new(Some(other_decision)),
        }
    }
}

impl AdoptionRepository for ConcurrentReviewRepository {
    fn insert_shelter(&self, shelter: NewShelter) -> Result<Shelter, RepositoryError> {
        self.inner.insert_shelter(shelter)
    }

    fn fetch_shelter(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        self.inner.fetch_shelter(id)
    }

    fn shelters(&self) -> Result<Vec<Shelter>, RepositoryError> {
        self.inner.shelters()
    }

    fn delete_shelter(&self, id: ShelterId) -> Result<(), RepositoryError> {
        self.inner.delete_shelter(id)
    }

    fn insert_pet(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, RepositoryError> {
        self.inner.insert_pet(shelter_id, pet)
    }

    fn fetch_pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        self.inner.fetch_pet(id)
    }

    fn update_pet(&self, pet: Pet) -> Result<(), RepositoryError> {
        self.inner.update_pet(pet)
    }

    fn pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        self.inner.pets()
    }

    fn pets_for_shelter(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError> {
        self.inner.pets_for_shelter(shelter_id)
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        self.inner.insert_application(application)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch_application(id)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        self.inner.update_application(application)
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications()
    }

    fn link_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationPet, RepositoryError> {
        self.inner.link_pet(application_id, pet_id)
    }

    fn fetch_application_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<Option<ApplicationPet>, RepositoryError> {
        self.inner.fetch_application_pet(application_id, pet_id)
    }

    fn update_application_pet(&self, link: ApplicationPet) -> Result<(), RepositoryError> {
        self.inner.update_application_pet(link)?;
        let other = self
            .other_decision
            .lock()
            .expect("decision mutex poisoned")
            .take();
        match other {
            Some(other) => self.inner.update_application_pet(other),
            None => Ok(()),
        }
    }

    fn application_pets(&self) -> Result<Vec<ApplicationPet>, RepositoryError> {
        self.inner.application_pets()
    }

    fn application_pets_for(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationPet>, RepositoryError> {
        self.inner.application_pets_for(application_id)
    }
}
