use super::common::*;
use crate::adoption::domain::{ApplicationStatus, PetId, ShelterId};
use crate::adoption::repository::{AdoptionRepository, RepositoryError};
use crate::adoption::validation::{FieldErrorKind, NumericInput, PetSubmission, ShelterSubmission};
use crate::adoption::{AdoptionServiceError, ShelterOrder};

fn pet_ids(pets: &[crate::adoption::Pet]) -> Vec<PetId> {
    pets.iter().map(|pet| pet.id).collect()
}

#[test]
fn search_returns_partial_matches() {
    let f = fixture();
    let found = f.directory.search("Fancy").expect("search runs");
    assert_eq!(ids(&found), vec![f.shelter_3.id]);

    let lowercase = f.directory.search("shelter").expect("search runs");
    assert_eq!(ids(&lowercase), vec![f.shelter_1.id, f.shelter_2.id]);
}

#[test]
fn reverse_alpha_shelters_orders_by_name_descending() {
    let f = fixture();
    let all = f.repository.shelters().expect("list shelters");
    assert_ne!(
        ids(&all),
        vec![f.shelter_2.id, f.shelter_3.id, f.shelter_1.id]
    );

    let ordered = f.directory.reverse_alpha_shelters().expect("query runs");
    assert_eq!(
        ids(&ordered),
        vec![f.shelter_2.id, f.shelter_3.id, f.shelter_1.id]
    );
}

#[test]
fn pending_app_shelters_are_distinct_and_alphabetical() {
    let f = fixture();
    let pet_5 = f
        .repository
        .insert_pet(f.shelter_1.id, new_pet("Biscuit", "beagle", 2, true))
        .expect("pet 5");
    f.repository
        .link_pet(f.application_2.id, pet_5.id)
        .expect("second link to shelter 1");

    let pending = f.directory.pending_app_shelters().expect("query runs");
    assert_eq!(ids(&pending), vec![f.shelter_1.id, f.shelter_3.id]);
}

#[test]
fn pending_app_shelters_ignore_other_statuses() {
    let f = fixture();
    let mut application = f.application_2.clone();
    application.status = ApplicationStatus::Rejected;
    f.repository
        .update_application(application)
        .expect("update succeeds");

    let pending = f.directory.pending_app_shelters().expect("query runs");
    assert_eq!(ids(&pending), vec![f.shelter_1.id]);
}

#[test]
fn order_by_recently_created_puts_newest_first() {
    let f = fixture();
    let ordered = f.directory.order_by_recently_created().expect("query runs");
    assert_eq!(
        ids(&ordered),
        vec![f.shelter_3.id, f.shelter_2.id, f.shelter_1.id]
    );
}

#[test]
fn order_by_number_of_pets_descends_and_keeps_empty_shelters() {
    let f = fixture();
    let ordered = f.directory.order_by_number_of_pets().expect("query runs");
    assert_eq!(
        ids(&ordered),
        vec![f.shelter_1.id, f.shelter_3.id, f.shelter_2.id]
    );
}

#[test]
fn find_name_and_address_returns_projection() {
    let f = fixture();
    let summary = f
        .directory
        .find_name_and_address(f.shelter_1.id)
        .expect("shelter found");
    assert_eq!(summary.id, f.shelter_1.id);
    assert_eq!(summary.name, f.shelter_1.name);
    assert_eq!(summary.city, f.shelter_1.city);
}

#[test]
fn find_name_and_address_reports_missing_shelter() {
    let f = fixture();
    match f.directory.find_name_and_address(ShelterId(99)) {
        Err(AdoptionServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn list_combines_search_with_order() {
    let f = fixture();
    let listed = f
        .directory
        .list(ShelterOrder::PetCount, Some("SHELTER"))
        .expect("list runs");
    assert_eq!(ids(&listed), vec![f.shelter_1.id, f.shelter_2.id]);

    let everything = f.directory.list(ShelterOrder::default(), None).expect("list runs");
    assert_eq!(
        ids(&everything),
        vec![f.shelter_2.id, f.shelter_3.id, f.shelter_1.id]
    );
}

#[test]
fn adoptable_pets_only_returns_adoptable() {
    let f = fixture();
    let pets = f.directory.adoptable_pets(&f.shelter_1).expect("query runs");
    assert_eq!(pet_ids(&pets), vec![f.pet_2.id, f.pet_4.id]);
}

#[test]
fn counts_partition_pets_by_adoptable_flag() {
    let f = fixture();
    assert_eq!(f.directory.pet_count(&f.shelter_1).expect("count"), 3);
    assert_eq!(
        f.directory
            .adoptable_pets_count(&f.shelter_1)
            .expect("count"),
        2
    );
    assert_eq!(f.directory.pets_adopted(&f.shelter_1).expect("count"), 1);
    assert_eq!(f.directory.pet_count(&f.shelter_2).expect("count"), 0);
}

#[test]
fn average_pet_age_rounds_to_two_decimals() {
    let f = fixture();
    assert_eq!(
        f.directory.average_pet_age(&f.shelter_1).expect("average"),
        Some(4.33)
    );
    assert_eq!(
        f.directory.average_pet_age(&f.shelter_2).expect("average"),
        None
    );
}

#[test]
fn alphabetical_pets_sorts_adoptable_pets_by_name() {
    let f = fixture();
    let pets = f.directory.alphabetical_pets(&f.shelter_1).expect("query runs");
    assert_eq!(pet_ids(&pets), vec![f.pet_4.id, f.pet_2.id]);
}

#[test]
fn shelter_pets_filtered_by_age_keeps_adoptable_pets_at_or_above_age() {
    let f = fixture();
    let pets = f
        .directory
        .shelter_pets_filtered_by_age(&f.shelter_1, 5)
        .expect("query runs");
    assert_eq!(pet_ids(&pets), vec![f.pet_4.id]);

    let everyone = f
        .directory
        .shelter_pets_filtered_by_age(&f.shelter_1, 0)
        .expect("query runs");
    assert_eq!(pet_ids(&everyone), vec![f.pet_2.id, f.pet_4.id]);
}

#[test]
fn profile_bundles_stats() {
    let f = fixture();
    let profile = f.directory.profile(f.shelter_3.id).expect("profile");
    assert_eq!(profile.shelter, f.shelter_3);
    assert_eq!(profile.stats.pet_count, 1);
    assert_eq!(profile.stats.adoptable_pets_count, 1);
    assert_eq!(profile.stats.pets_adopted, 0);
    assert_eq!(profile.stats.average_pet_age, Some(8.0));
}

#[test]
fn deleting_a_shelter_removes_its_pets_and_links() {
    let f = fixture();
    f.directory
        .delete_shelter(f.shelter_1.id)
        .expect("delete succeeds");

    assert!(f
        .repository
        .fetch_shelter(f.shelter_1.id)
        .expect("fetch")
        .is_none());
    for pet in [&f.pet_1, &f.pet_2, &f.pet_4] {
        assert!(f.repository.fetch_pet(pet.id).expect("fetch").is_none());
    }
    assert!(f
        .repository
        .fetch_pet(f.pet_3.id)
        .expect("fetch")
        .is_some());
    assert!(f
        .repository
        .application_pets_for(f.application_1.id)
        .expect("links")
        .is_empty());
    assert_eq!(
        f.repository
            .application_pets_for(f.application_2.id)
            .expect("links")
            .len(),
        1
    );

    match f.directory.delete_shelter(f.shelter_1.id) {
        Err(AdoptionServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found on second delete, got {other:?}"),
    }
}

#[test]
fn create_shelter_requires_name_city_and_numeric_rank() {
    let f = fixture();

    match f.directory.create_shelter(ShelterSubmission::default()) {
        Err(AdoptionServiceError::Validation(errors)) => {
            assert!(errors.contains("name", FieldErrorKind::Blank));
            assert!(errors.contains("city", FieldErrorKind::Blank));
            assert!(errors.contains("rank", FieldErrorKind::Blank));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let wordy_rank = ShelterSubmission {
        name: Some("Boulder Humane".to_string()),
        city: Some("Boulder, CO".to_string()),
        rank: Some(NumericInput::from("nine")),
        foster_program: None,
    };
    match f.directory.create_shelter(wordy_rank) {
        Err(AdoptionServiceError::Validation(errors)) => {
            assert_eq!(errors.messages(), vec!["Rank is not a number".to_string()]);
        }
        other => panic!("expected numericality error, got {other:?}"),
    }

    let before = f.repository.shelters().expect("list").len();
    assert_eq!(before, 3, "invalid shelters are not persisted");
}

#[test]
fn create_pet_requires_existing_shelter() {
    let f = fixture();
    let submission = PetSubmission {
        name: Some("Biscuit".to_string()),
        breed: Some("beagle".to_string()),
        age: Some(NumericInput::from(2)),
        adoptable: None,
    };

    let pet = f
        .directory
        .create_pet(f.shelter_2.id, submission.clone())
        .expect("pet created");
    assert!(pet.adoptable, "pets default to adoptable");
    assert_eq!(pet.shelter_id, f.shelter_2.id);

    match f.directory.create_pet(ShelterId(42), submission) {
        Err(AdoptionServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
