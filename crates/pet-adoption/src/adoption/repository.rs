use super::domain::{
    Application, ApplicationId, ApplicationPet, NewApplication, NewPet, NewShelter, Pet, PetId,
    Shelter, ShelterId,
};

/// Storage abstraction over the shelter, pet, application and join tables.
///
/// Implementations assign ids and creation timestamps. Listing methods return rows in id order.
pub trait AdoptionRepository: Send + Sync {
    fn insert_shelter(&self, shelter: NewShelter) -> Result<Shelter, RepositoryError>;
    fn fetch_shelter(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError>;
    fn shelters(&self) -> Result<Vec<Shelter>, RepositoryError>;
    /// Removes the shelter, its pets, and every application link to those pets.
    fn delete_shelter(&self, id: ShelterId) -> Result<(), RepositoryError>;

    fn insert_pet(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, RepositoryError>;
    fn fetch_pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
    fn update_pet(&self, pet: Pet) -> Result<(), RepositoryError>;
    fn pets(&self) -> Result<Vec<Pet>, RepositoryError>;
    fn pets_for_shelter(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError>;

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;

    /// Fails with `Conflict` when the pet is already on the application.
    fn link_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationPet, RepositoryError>;
    fn fetch_application_pet(
        &self,
        application_id: ApplicationId,
        pet_id: PetId,
    ) -> Result<Option<ApplicationPet>, RepositoryError>;
    fn update_application_pet(&self, link: ApplicationPet) -> Result<(), RepositoryError>;
    fn application_pets(&self) -> Result<Vec<ApplicationPet>, RepositoryError>;
    fn application_pets_for(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ApplicationPet>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
