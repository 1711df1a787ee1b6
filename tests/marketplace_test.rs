// Integration tests for marketplace data semantics
use chrono::{Duration, Utc};
use uuid::Uuid;

use pawnest::models::{ApplicationStatus, PetSpecies, PetStatus, ProfileUpdate};
use pawnest::store::{
    ApplicationStore, FavoriteStore, PetFilter, PetStore, ProfileStore, StoreError, StoryStore,
};
use pawnest::testing::{MemoryStore, TestFixtures};

#[tokio::test]
async fn test_browse_filters_narrow_the_index() {
    let store = MemoryStore::new();
    let publisher = Uuid::new_v4();

    // One young corgi and one senior cat
    let dog = store
        .insert_pet(&TestFixtures::new_pet(publisher))
        .await
        .expect("insert dog");
    let mut cat_submission = TestFixtures::new_pet(publisher);
    cat_submission.name = "Mochi".to_string();
    cat_submission.species = PetSpecies::Cat;
    cat_submission.breed = Some("Tabby".to_string());
    cat_submission.age_years = 9;
    let cat = store
        .insert_pet(&cat_submission)
        .await
        .expect("insert cat");

    let all = store
        .list_pets(&PetFilter::default())
        .await
        .expect("unfiltered listing");
    assert_eq!(all.len(), 2);

    let cats = store
        .list_pets(&PetFilter {
            species: Some(PetSpecies::Cat),
            ..PetFilter::default()
        })
        .await
        .expect("species filter");
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].id, cat.id);

    let seniors = store
        .list_pets(&PetFilter {
            min_age_years: Some(8),
            ..PetFilter::default()
        })
        .await
        .expect("age filter");
    assert_eq!(seniors.len(), 1);
    assert_eq!(seniors[0].id, cat.id);

    // Free-text search is case-insensitive and reaches the breed column
    let search = store
        .list_pets(&PetFilter {
            search: Some("CORGI".to_string()),
            ..PetFilter::default()
        })
        .await
        .expect("text search");
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].id, dog.id);
}

#[tokio::test]
async fn test_adopted_pets_drop_out_of_available_listings() {
    let store = MemoryStore::new();
    let publisher = Uuid::new_v4();

    store
        .insert_pet(&TestFixtures::new_pet(publisher))
        .await
        .expect("insert available pet");

    let mut adopted = TestFixtures::pet(publisher);
    adopted.name = "Shadow".to_string();
    adopted.status = PetStatus::Adopted;
    store.seed_pet(adopted);

    let available = store
        .list_pets(&PetFilter {
            status: Some(PetStatus::Available),
            ..PetFilter::default()
        })
        .await
        .expect("available listing");
    assert_eq!(available.len(), 1);
    assert!(available.iter().all(|p| p.status == PetStatus::Available));

    // The publisher still sees every listing of theirs, adopted included
    let own = store
        .list_by_publisher(publisher)
        .await
        .expect("own listings");
    assert_eq!(own.len(), 2);
}

#[tokio::test]
async fn test_listings_come_back_newest_first() {
    let store = MemoryStore::new();
    let publisher = Uuid::new_v4();

    let mut older = TestFixtures::pet(publisher);
    older.name = "Older".to_string();
    older.created_at = Utc::now() - Duration::hours(2);
    let mut newer = TestFixtures::pet(publisher);
    newer.name = "Newer".to_string();

    // Seed oldest first so ordering cannot come from insertion order alone
    store.seed_pet(older);
    store.seed_pet(newer);

    let pets = store
        .list_pets(&PetFilter::default())
        .await
        .expect("listing");
    assert_eq!(pets[0].name, "Newer");
    assert_eq!(pets[1].name, "Older");
}

#[tokio::test]
async fn test_duplicate_application_is_a_unique_violation() {
    let store = MemoryStore::new();
    let publisher = Uuid::new_v4();
    let applicant = Uuid::new_v4();

    let pet = store
        .insert_pet(&TestFixtures::new_pet(publisher))
        .await
        .expect("insert pet");

    let submission = TestFixtures::new_application(pet.id, applicant);
    let first = store
        .insert_application(&submission)
        .await
        .expect("first application");
    assert_eq!(first.status, ApplicationStatus::Pending);

    // Same (pet, applicant) pair hits the unique index
    let err = store
        .insert_application(&submission)
        .await
        .expect_err("duplicate application must fail");
    assert!(err.is_unique_violation());

    // A different applicant for the same pet is fine
    store
        .insert_application(&TestFixtures::new_application(pet.id, Uuid::new_v4()))
        .await
        .expect("second applicant");

    assert_eq!(
        store
            .list_by_applicant(applicant)
            .await
            .expect("own applications")
            .len(),
        1
    );
    assert!(store
        .find_application(pet.id, applicant)
        .await
        .expect("pair lookup")
        .is_some());
    assert!(store
        .find_application(pet.id, Uuid::new_v4())
        .await
        .expect("pair lookup")
        .is_none());
}

#[tokio::test]
async fn test_favorites_are_idempotent() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();

    let pet = store
        .insert_pet(&TestFixtures::new_pet(Uuid::new_v4()))
        .await
        .expect("insert pet");

    store.add_favorite(user, pet.id).await.expect("save");
    store
        .add_favorite(user, pet.id)
        .await
        .expect("saving twice is a no-op");
    assert_eq!(
        store.list_favorites(user).await.expect("favorites").len(),
        1
    );

    assert!(store
        .remove_favorite(user, pet.id)
        .await
        .expect("remove reports hit"));
    assert!(!store
        .remove_favorite(user, pet.id)
        .await
        .expect("second remove reports miss"));
    assert!(store
        .list_favorites(user)
        .await
        .expect("favorites")
        .is_empty());
}

#[tokio::test]
async fn test_story_feed_is_published_only_and_capped() {
    let store = MemoryStore::new();
    let adopter = Uuid::new_v4();

    for i in 0..22 {
        let mut story = TestFixtures::story(Uuid::new_v4(), adopter);
        story.title = format!("Home number {i}");
        store.seed_story(story);
    }
    let mut draft = TestFixtures::story(Uuid::new_v4(), adopter);
    draft.title = "Unfinished draft".to_string();
    draft.is_published = false;
    store.seed_story(draft);

    let feed = store.list_published_stories().await.expect("feed");
    assert_eq!(feed.len(), 20, "the public feed caps at twenty stories");
    assert!(feed.iter().all(|story| story.is_published));
    assert!(feed.iter().all(|story| story.title != "Unfinished draft"));
}

#[tokio::test]
async fn test_profile_patch_applies_only_supplied_fields() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    store.seed_profile(TestFixtures::profile(id));

    let update = ProfileUpdate {
        display_name: Some("Amy A.".to_string()),
        bio: Some("Corgi person".to_string()),
        ..ProfileUpdate::default()
    };
    let updated = store.update_profile(id, &update).await.expect("patch");
    assert_eq!(updated.display_name.as_deref(), Some("Amy A."));
    assert_eq!(updated.bio.as_deref(), Some("Corgi person"));

    // Fields the patch never mentioned survive untouched
    assert_eq!(updated.location.as_deref(), Some("Portland, OR"));
    assert_eq!(updated.username.as_deref(), Some("amy"));

    let err = store
        .update_profile(Uuid::new_v4(), &update)
        .await
        .expect_err("patching a missing profile must fail");
    assert!(matches!(err, StoreError::MissingRow));
}

#[tokio::test]
async fn test_publisher_delete_requires_ownership() {
    let store = MemoryStore::new();
    let publisher = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let pet = store
        .insert_pet(&TestFixtures::new_pet(publisher))
        .await
        .expect("insert pet");

    // Someone else's delete is refused and the listing survives
    assert!(!store
        .delete_pet(pet.id, stranger)
        .await
        .expect("stranger delete"));
    assert!(store.get_pet(pet.id).await.expect("lookup").is_some());

    assert!(store
        .delete_pet(pet.id, publisher)
        .await
        .expect("owner delete"));
    assert!(store.get_pet(pet.id).await.expect("lookup").is_none());
}
