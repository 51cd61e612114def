//! Shelters, pets, and the adoption application workflow.

pub mod domain;
pub mod import;
pub mod memory;
pub(crate) mod pets;
pub mod repository;
pub mod router;
pub mod service;
pub mod shelters;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationPet, ApplicationPetId, ApplicationPetStatus,
    ApplicationStatus, NewApplication, NewPet, NewShelter, Pet, PetId, Shelter, ShelterId,
    ShelterSummary,
};
pub use import::{DirectoryImportError, DirectoryImporter, ImportSummary};
pub use memory::InMemoryAdoptionRepository;
pub use repository::{AdoptionRepository, RepositoryError};
pub use router::{adoption_router, AdoptionState};
pub use service::{
    AdoptionApplicationService, AdoptionServiceError, ApplicationDetail, ApplicationPage,
    ApplicationPetView,
};
pub use shelters::{AdminDashboard, ShelterDirectory, ShelterOrder, ShelterProfile, ShelterStats};
pub use validation::{
    ApplicationSubmission, FieldError, FieldErrorKind, NumericInput, PetSubmission,
    ShelterSubmission, ValidationErrors,
};
