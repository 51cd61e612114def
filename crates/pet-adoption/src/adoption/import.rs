//! Loads a shelter directory export (one row per pet) into the repository.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::NewShelter;
use super::repository::AdoptionRepository;
use super::service::AdoptionServiceError;
use super::shelters::ShelterDirectory;
use super::validation::{
    validate_pet, validate_shelter, NumericInput, PetSubmission, ShelterSubmission,
    ValidationErrors,
};

#[derive(Debug)]
pub enum DirectoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow {
        row: usize,
        source: ValidationErrors,
    },
    InvalidFlag {
        row: usize,
        column: &'static str,
        value: String,
    },
    ConflictingShelter {
        row: usize,
        shelter: String,
        column: &'static str,
    },
    Service(AdoptionServiceError),
}

impl fmt::Display for DirectoryImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryImportError::Io(err) => write!(f, "failed to read directory export: {err}"),
            DirectoryImportError::Csv(err) => write!(f, "invalid directory CSV data: {err}"),
            DirectoryImportError::InvalidRow { row, source } => {
                write!(f, "row {row}: {source}")
            }
            DirectoryImportError::InvalidFlag { row, column, value } => {
                write!(f, "row {row}: '{value}' is not a yes/no value for {column}")
            }
            DirectoryImportError::ConflictingShelter {
                row,
                shelter,
                column,
            } => write!(
                f,
                "row {row}: {column} for '{shelter}' differs from the shelter's first row"
            ),
            DirectoryImportError::Service(err) => {
                write!(f, "could not store directory entry: {err}")
            }
        }
    }
}

impl std::error::Error for DirectoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectoryImportError::Io(err) => Some(err),
            DirectoryImportError::Csv(err) => Some(err),
            DirectoryImportError::InvalidRow { source, .. } => Some(source),
            DirectoryImportError::InvalidFlag { .. }
            | DirectoryImportError::ConflictingShelter { .. } => None,
            DirectoryImportError::Service(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DirectoryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DirectoryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts of rows written by an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub shelters_created: usize,
    pub pets_created: usize,
}

pub struct DirectoryImporter;

impl DirectoryImporter {
    pub fn from_path<P, R>(
        path: P,
        directory: &ShelterDirectory<R>,
    ) -> Result<ImportSummary, DirectoryImportError>
    where
        P: AsRef<Path>,
        R: AdoptionRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, directory)
    }

    /// Rows naming the same shelter share one shelter record; a blank `Pet` cell lists none.
    ///
    /// Every row is validated before anything is written, so a bad row leaves the
    /// directory untouched. Later rows for a known shelter may leave its cells blank,
    /// but a filled cell must match the shelter's first row.
    pub fn from_reader<S, R>(
        reader: S,
        directory: &ShelterDirectory<R>,
    ) -> Result<ImportSummary, DirectoryImportError>
    where
        S: Read,
        R: AdoptionRepository + 'static,
    {
        let plan = plan_import(reader)?;
        let mut summary = ImportSummary::default();

        for entry in plan {
            let shelter = directory
                .create_shelter(entry.submission)
                .map_err(DirectoryImportError::Service)?;
            summary.shelters_created += 1;

            for pet in entry.pets {
                directory
                    .create_pet(shelter.id, pet)
                    .map_err(DirectoryImportError::Service)?;
                summary.pets_created += 1;
            }
        }

        Ok(summary)
    }
}

/// A validated shelter and the pets listed under it, in file order.
struct PlannedShelter {
    submission: ShelterSubmission,
    shelter: NewShelter,
    pets: Vec<PetSubmission>,
}

fn plan_import<S: Read>(reader: S) -> Result<Vec<PlannedShelter>, DirectoryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut plan: Vec<PlannedShelter> = Vec::new();
    let mut known: HashMap<String, usize> = HashMap::new();

    for (index, record) in csv_reader.deserialize::<DirectoryRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;

        let slot = match known.get(&row.shelter) {
            Some(&slot) => {
                row.check_consistent(row_number, &plan[slot].shelter)?;
                slot
            }
            None => {
                let submission = row.shelter_submission(row_number)?;
                let shelter = validate_shelter(submission.clone())
                    .map_err(|source| invalid_row(row_number, source))?;
                known.insert(row.shelter.clone(), plan.len());
                plan.push(PlannedShelter {
                    submission,
                    shelter,
                    pets: Vec::new(),
                });
                plan.len() - 1
            }
        };

        if let Some(pet) = row.pet_submission(row_number)? {
            validate_pet(pet.clone()).map_err(|source| invalid_row(row_number, source))?;
            plan[slot].pets.push(pet);
        }
    }

    Ok(plan)
}

fn invalid_row(row: usize, source: ValidationErrors) -> DirectoryImportError {
    DirectoryImportError::InvalidRow { row, source }
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    #[serde(rename = "Shelter")]
    shelter: String,
    #[serde(rename = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(rename = "Rank", default, deserialize_with = "empty_string_as_none")]
    rank: Option<String>,
    #[serde(
        rename = "Foster Program",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    foster_program: Option<String>,
    #[serde(rename = "Pet", default, deserialize_with = "empty_string_as_none")]
    pet: Option<String>,
    #[serde(rename = "Breed", default, deserialize_with = "empty_string_as_none")]
    breed: Option<String>,
    #[serde(rename = "Age", default, deserialize_with = "empty_string_as_none")]
    age: Option<String>,
    #[serde(
        rename = "Adoptable",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    adoptable: Option<String>,
}

impl DirectoryRow {
    fn shelter_submission(&self, row: usize) -> Result<ShelterSubmission, DirectoryImportError> {
        Ok(ShelterSubmission {
            name: Some(self.shelter.clone()),
            city: self.city.clone(),
            rank: self.rank.as_deref().map(NumericInput::from),
            foster_program: parse_flag(row, "Foster Program", self.foster_program.as_deref())?,
        })
    }

    /// Blank shelter cells inherit from the first row; filled ones must agree with it.
    fn check_consistent(
        &self,
        row: usize,
        first: &NewShelter,
    ) -> Result<(), DirectoryImportError> {
        let merged = ShelterSubmission {
            name: Some(self.shelter.clone()),
            city: self.city.clone().or_else(|| Some(first.city.clone())),
            rank: Some(match self.rank.as_deref() {
                Some(rank) => NumericInput::from(rank),
                None => NumericInput::from(i64::from(first.rank)),
            }),
            foster_program: parse_flag(row, "Foster Program", self.foster_program.as_deref())?
                .or(Some(first.foster_program)),
        };
        let shelter = validate_shelter(merged).map_err(|source| invalid_row(row, source))?;

        let conflict = if shelter.city != first.city {
            Some("City")
        } else if shelter.rank != first.rank {
            Some("Rank")
        } else if shelter.foster_program != first.foster_program {
            Some("Foster Program")
        } else {
            None
        };

        match conflict {
            Some(column) => Err(DirectoryImportError::ConflictingShelter {
                row,
                shelter: self.shelter.clone(),
                column,
            }),
            None => Ok(()),
        }
    }

    fn pet_submission(&self, row: usize) -> Result<Option<PetSubmission>, DirectoryImportError> {
        let Some(name) = self.pet.clone() else {
            return Ok(None);
        };

        Ok(Some(PetSubmission {
            name: Some(name),
            breed: self.breed.clone(),
            age: self.age.as_deref().map(NumericInput::from),
            adoptable: parse_flag(row, "Adoptable", self.adoptable.as_deref())?,
        }))
    }
}

fn parse_flag(
    row: usize,
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<bool>, DirectoryImportError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(Some(true)),
        "false" | "no" | "n" | "0" => Ok(Some(false)),
        _ => Err(DirectoryImportError::InvalidFlag {
            row,
            column,
            value: value.to_string(),
        }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
