//! Behaviour every backend must share, run against each one from its tests

use sushi_core::{Sushi, SushiRepository};

fn california_roll(id: &str) -> Sushi {
    Sushi::new(
        id,
        "1",
        "California Roll",
        vec!["Crab".into(), "Avocado".into()],
    )
}

/// Expects an empty repository.
pub async fn run_all(repo: &dyn SushiRepository) {
    listing_matches_created_records(repo).await;
    create_then_get_round_trips(repo).await;
    duplicate_create_is_rejected(repo).await;
    missing_id_is_not_found(repo).await;
    update_of_missing_id_is_not_found(repo).await;
    delete_is_idempotent(repo).await;
    full_lifecycle(repo).await;
}

async fn listing_matches_created_records(repo: &dyn SushiRepository) {
    assert!(repo.get_sushis().await.unwrap().is_empty());

    let created = vec![
        california_roll("L1"),
        Sushi::new("L2", "2", "Tiger Roll", vec!["Shrimp tempura".into()]),
        Sushi::new("L3", "", "", vec![]),
    ];
    for sushi in &created {
        repo.create_sushi(sushi).await.unwrap();
    }

    let listed = repo.get_sushis().await.unwrap();
    assert_eq!(listed.len(), created.len());
    for sushi in &created {
        assert!(
            listed.iter().any(|s| s.same_content(sushi)),
            "missing {} in listing",
            sushi.id
        );
    }

    for sushi in &created {
        repo.delete_sushi(&sushi.id).await.unwrap();
    }
    assert!(repo.get_sushis().await.unwrap().is_empty());
}

async fn create_then_get_round_trips(repo: &dyn SushiRepository) {
    let sushi = california_roll("R1");
    repo.create_sushi(&sushi).await.unwrap();

    let fetched = repo.get_sushi_by_id("R1").await.unwrap();
    assert!(fetched.same_content(&sushi));

    let sparse = Sushi::new("R2", "", "", vec![]);
    repo.create_sushi(&sparse).await.unwrap();
    let fetched = repo.get_sushi_by_id("R2").await.unwrap();
    assert!(fetched.same_content(&sparse));
}

async fn duplicate_create_is_rejected(repo: &dyn SushiRepository) {
    repo.create_sushi(&california_roll("D1")).await.unwrap();

    let err = repo
        .create_sushi(&Sushi::new("D1", "9", "Impostor Roll", vec![]))
        .await
        .unwrap_err();
    assert!(err.is_already_exists(), "unexpected error: {err}");

    let kept = repo.get_sushi_by_id("D1").await.unwrap();
    assert_eq!(kept.name, "California Roll");
}

async fn missing_id_is_not_found(repo: &dyn SushiRepository) {
    let err = repo.get_sushi_by_id("missing").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

async fn update_of_missing_id_is_not_found(repo: &dyn SushiRepository) {
    let err = repo
        .update_sushi("U404", &california_roll("U404"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    assert!(repo.get_sushi_by_id("U404").await.unwrap_err().is_not_found());
}

async fn delete_is_idempotent(repo: &dyn SushiRepository) {
    repo.delete_sushi("never_created").await.unwrap();

    repo.create_sushi(&california_roll("X1")).await.unwrap();
    repo.delete_sushi("X1").await.unwrap();
    repo.delete_sushi("X1").await.unwrap();
    assert!(repo.get_sushi_by_id("X1").await.unwrap_err().is_not_found());
}

async fn full_lifecycle(repo: &dyn SushiRepository) {
    let created = Sushi::new(
        "A1",
        "",
        "California Roll",
        vec!["Crab".into(), "Avocado".into()],
    );
    repo.create_sushi(&created).await.unwrap();
    assert!(repo.get_sushi_by_id("A1").await.unwrap().same_content(&created));

    // Body id is ignored in favour of the lookup key
    let replacement = Sushi::new("", "", "Dragon Roll", vec!["Eel".into()]);
    repo.update_sushi("A1", &replacement).await.unwrap();

    let updated = repo.get_sushi_by_id("A1").await.unwrap();
    assert!(updated.same_content(&Sushi::new("A1", "", "Dragon Roll", vec!["Eel".into()])));

    repo.delete_sushi("A1").await.unwrap();
    assert!(repo.get_sushi_by_id("A1").await.unwrap_err().is_not_found());
}
