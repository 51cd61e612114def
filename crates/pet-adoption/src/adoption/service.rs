use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    Application, ApplicationId, ApplicationPet, ApplicationPetStatus, ApplicationStatus, Pet,
    PetId,
};
use super::pets;
use super::repository::{AdoptionRepository, RepositoryError};
use super::validation::{validate_application, ApplicationSubmission, ValidationErrors};

/// Application together with the pets it asks for and the admin decision on each.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub eligible: bool,
    pub pets: Vec<ApplicationPetView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationPetView {
    #[serde(flatten)]
    pub pet: Pet,
    pub decision: ApplicationPetStatus,
}

/// Public application page: the detail plus pets matching the visitor's search.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationPage {
    #[serde(flatten)]
    pub detail: ApplicationDetail,
    pub search_results: Vec<Pet>,
}

/// Drives an application from intake through per-pet admin review.
pub struct AdoptionApplicationService<R> {
    repository: Arc<R>,
}

impl<R> AdoptionApplicationService<R>
where
    R: AdoptionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, AdoptionServiceError> {
        let application = validate_application(submission)?;
        let stored = self.repository.insert_application(application)?;
        info!(application_id = %stored.id, "application created");
        Ok(stored)
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, AdoptionServiceError> {
        let application = self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn detail(&self, id: ApplicationId) -> Result<ApplicationDetail, AdoptionServiceError> {
        let application = self.get(id)?;
        let mut pets = Vec::new();
        for link in self.repository.application_pets_for(id)? {
            // Links to deleted pets are dropped with the shelter, so a miss here is a race.
            if let Some(pet) = self.repository.fetch_pet(link.pet_id)? {
                pets.push(ApplicationPetView {
                    pet,
                    decision: link.status,
                });
            }
        }

        Ok(ApplicationDetail {
            eligible: application.eligible(),
            application,
            pets,
        })
    }

    pub fn show(
        &self,
        id: ApplicationId,
        query: Option<&str>,
    ) -> Result<ApplicationPage, AdoptionServiceError> {
        let detail = self.detail(id)?;
        let search_results = self.search_pets(query)?;
        Ok(ApplicationPage {
            detail,
            search_results,
        })
    }

    pub fn search_pets(&self, query: Option<&str>) -> Result<Vec<Pet>, AdoptionServiceError> {
        Ok(pets::search(self.repository.pets()?, query))
    }

    /// Attach an adoptable pet while the adopter is still filling in the application.
    pub fn add_pet(
        &self,
        id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationPet, AdoptionServiceError> {
        let application = self.get(id)?;
        if application.status != ApplicationStatus::InProgress {
            return Err(AdoptionServiceError::InvalidTransition {
                from: application.status,
                action: "add pets to",
            });
        }

        let pet = self
            .repository
            .fetch_pet(pet_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !pet.adoptable {
            return Err(AdoptionServiceError::PetNotAdoptable(pet_id));
        }

        let link = self.repository.link_pet(id, pet_id)?;
        debug!(application_id = %id, pet_id = %pet_id, "pet added to application");
        Ok(link)
    }

    /// Hand the application over for review.
    pub fn submit(&self, id: ApplicationId) -> Result<Application, AdoptionServiceError> {
        let mut application = self.get(id)?;
        if application.status != ApplicationStatus::InProgress {
            return Err(AdoptionServiceError::InvalidTransition {
                from: application.status,
                action: "submit",
            });
        }
        if self.repository.application_pets_for(id)?.is_empty() {
            return Err(AdoptionServiceError::NoPetsSelected(id));
        }

        application.status = ApplicationStatus::Pending;
        self.repository.update_application(application.clone())?;
        info!(application_id = %id, "application submitted for review");
        Ok(application)
    }

    pub fn approve_pet(
        &self,
        id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        self.decide(id, pet_id, ApplicationPetStatus::Approved)
    }

    pub fn reject_pet(
        &self,
        id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        self.decide(id, pet_id, ApplicationPetStatus::Rejected)
    }

    fn decide(
        &self,
        id: ApplicationId,
        pet_id: PetId,
        decision: ApplicationPetStatus,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        let mut application = self.get(id)?;
        if application.status.is_final() {
            return Err(AdoptionServiceError::InvalidTransition {
                from: application.status,
                action: match decision {
                    ApplicationPetStatus::Rejected => "reject pets on",
                    _ => "approve pets on",
                },
            });
        }

        let mut link = self.repository.fetch_application_pet(id, pet_id)?.ok_or(
            AdoptionServiceError::PetNotOnApplication {
                application_id: id,
                pet_id,
            },
        )?;
        link.status = decision;
        self.repository.update_application_pet(link)?;
        info!(application_id = %id, pet_id = %pet_id, decision = %decision, "pet reviewed");

        // Re-read the links: other admins may have decided pets since the fetch above.
        let links = self.repository.application_pets_for(id)?;
        if let Some(status) = rolled_up_status(&links) {
            application.status = status;
            self.repository.update_application(application)?;
            if status == ApplicationStatus::Approved {
                self.mark_adopted(&links)?;
            }
            info!(application_id = %id, status = %status, "application review complete");
        }

        self.detail(id)
    }

    fn mark_adopted(&self, links: &[ApplicationPet]) -> Result<(), AdoptionServiceError> {
        for link in links {
            if let Some(mut pet) = self.repository.fetch_pet(link.pet_id)? {
                pet.adoptable = false;
                self.repository.update_pet(pet)?;
            }
        }
        Ok(())
    }
}

/// Final application status once every pet has a decision; `None` while any are undecided.
fn rolled_up_status(links: &[ApplicationPet]) -> Option<ApplicationStatus> {
    if links.is_empty()
        || links
            .iter()
            .any(|link| link.status == ApplicationPetStatus::Pending)
    {
        return None;
    }

    if links
        .iter()
        .any(|link| link.status == ApplicationPetStatus::Rejected)
    {
        Some(ApplicationStatus::Rejected)
    } else {
        Some(ApplicationStatus::Approved)
    }
}

/// Error raised by the shelter directory and the application workflow.
#[derive(Debug, thiserror::Error)]
pub enum AdoptionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("cannot {action} an application that is {from}")]
    InvalidTransition {
        from: ApplicationStatus,
        action: &'static str,
    },
    #[error("pet {0} is not adoptable")]
    PetNotAdoptable(PetId),
    #[error("application {0} has no pets selected")]
    NoPetsSelected(ApplicationId),
    #[error("pet {pet_id} is not on application {application_id}")]
    PetNotOnApplication {
        application_id: ApplicationId,
        pet_id: PetId,
    },
}
