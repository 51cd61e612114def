use crate::infra::seed_directory;
use clap::Args;
use pet_adoption::adoption::{
    AdminDashboard, AdoptionRepository, InMemoryAdoptionRepository, ShelterDirectory,
};
use pet_adoption::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Directory CSV export (Shelter,City,Rank,Foster Program,Pet,Breed,Age,Adoptable)
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Only list adoptable pets at or above this age for each shelter
    #[arg(long)]
    pub(crate) min_age: Option<u32>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryAdoptionRepository::default());
    let directory = ShelterDirectory::new(repository);
    let summary = seed_directory(Some(args.seed.as_path()), &directory)?.unwrap_or_default();

    println!(
        "Loaded {} shelters and {} pets from {}",
        summary.shelters_created,
        summary.pets_created,
        args.seed.display()
    );

    let dashboard = directory.admin_dashboard()?;
    for line in render_report(&directory, &dashboard, args.min_age)? {
        println!("{line}");
    }
    Ok(())
}

fn render_report<R>(
    directory: &ShelterDirectory<R>,
    dashboard: &AdminDashboard,
    min_age: Option<u32>,
) -> Result<Vec<String>, AppError>
where
    R: AdoptionRepository + 'static,
{
    let mut lines = vec!["\nShelters (reverse alphabetical)".to_string()];
    for shelter in &dashboard.shelters {
        let stats = directory.stats(shelter)?;
        let average = stats
            .average_pet_age
            .map(|age| format!("{age:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!(
            "- {} ({}) rank {} | {} pets, {} adoptable, {} adopted, avg age {}",
            shelter.name,
            shelter.city,
            shelter.rank,
            stats.pet_count,
            stats.adoptable_pets_count,
            stats.pets_adopted,
            average
        ));

        let pets = match min_age {
            Some(age) => directory.shelter_pets_filtered_by_age(shelter, age)?,
            None => directory.alphabetical_pets(shelter)?,
        };
        for pet in pets {
            lines.push(format!("    * {} ({} yrs)", pet.name, pet.age));
        }
    }

    lines.push("\nShelters with pending applications".to_string());
    if dashboard.pending_app_shelters.is_empty() {
        lines.push("- none".to_string());
    }
    for shelter in &dashboard.pending_app_shelters {
        lines.push(format!("- {}", shelter.name));
    }
    Ok(lines)
}
