use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Primary key of a shelter row.
    ShelterId
);
record_id!(
    /// Primary key of a pet row.
    PetId
);
record_id!(
    /// Primary key of an adoption application.
    ApplicationId
);
record_id!(
    /// Primary key of the join row between an application and a pet.
    ApplicationPetId
);

/// Organization housing pets for adoption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub city: String,
    pub rank: i32,
    pub foster_program: bool,
    pub created_at: DateTime<Utc>,
}

/// Animal record owned by a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub shelter_id: ShelterId,
    pub name: String,
    pub breed: Option<String>,
    pub age: u32,
    pub adoptable: bool,
    pub created_at: DateTime<Utc>,
}

/// Prospective adopter's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub description: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Only applications still being filled in by the adopter qualify.
    pub fn eligible(&self) -> bool {
        self.status == ApplicationStatus::InProgress
    }
}

/// Join row linking an application to one of the pets it asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPet {
    pub id: ApplicationPetId,
    pub application_id: ApplicationId,
    pub pet_id: PetId,
    pub status: ApplicationPetStatus,
}

/// Validated shelter attributes ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShelter {
    pub name: String,
    pub city: String,
    pub rank: i32,
    pub foster_program: bool,
}

/// Validated pet attributes ready for insertion under a shelter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub breed: Option<String>,
    pub age: u32,
    pub adoptable: bool,
}

/// Validated application attributes ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub description: String,
    pub status: ApplicationStatus,
}

/// Lifecycle of an adoption application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ApplicationStatus {
    InProgress,
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::InProgress => "In Progress",
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "inprogress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApplicationStatus> for String {
    fn from(value: ApplicationStatus) -> Self {
        value.label().to_string()
    }
}

/// Admin decision recorded against a single pet on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationPetStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationPetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationPetStatus::Pending => "Pending",
            ApplicationPetStatus::Approved => "Approved",
            ApplicationPetStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationPetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projection returned by the admin shelter lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterSummary {
    pub id: ShelterId,
    pub name: String,
    pub city: String,
}

impl From<&Shelter> for ShelterSummary {
    fn from(shelter: &Shelter) -> Self {
        Self {
            id: shelter.id,
            name: shelter.name.clone(),
            city: shelter.city.clone(),
        }
    }
}
