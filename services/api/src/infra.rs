use metrics_exporter_prometheus::PrometheusHandle;
use pet_adoption::adoption::{
    AdoptionRepository, DirectoryImportError, DirectoryImporter, ImportSummary, ShelterDirectory,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the optional directory export into a freshly built repository.
pub(crate) fn seed_directory<R>(
    seed: Option<&Path>,
    directory: &ShelterDirectory<R>,
) -> Result<Option<ImportSummary>, DirectoryImportError>
where
    R: AdoptionRepository + 'static,
{
    let Some(path) = seed else {
        return Ok(None);
    };

    let summary = DirectoryImporter::from_path(path, directory)?;
    info!(
        path = %path.display(),
        shelters = summary.shelters_created,
        pets = summary.pets_created,
        "shelter directory seeded"
    );
    Ok(Some(summary))
}
