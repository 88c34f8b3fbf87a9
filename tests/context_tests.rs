pub mod common;

use common::{TestContext, new_film};
use film_catalog::entity::{actor, film};
use film_catalog::{DataContext, DatabaseConfig, EntityState, FilmRepository, Repository};
use pretty_assertions::assert_eq;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, TryIntoModel};

#[tokio::test]
async fn tracker_follows_staged_models() {
    let ctx = TestContext::new().await;
    let films = ctx.db.films();
    let avatar = films
        .find_by_id(1)
        .one(ctx.db.connection())
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    let tracker = ctx.db.tracker();

    assert_eq!(tracker.state_of(&avatar), EntityState::Detached);
    films.attach(avatar.clone());
    assert_eq!(tracker.state_of(&avatar), EntityState::Unchanged);
    assert!(!tracker.has_changes());

    let mut longer = avatar.clone();
    longer.duration = Set(171);
    films.update(longer);
    assert_eq!(tracker.state_of(&avatar), EntityState::Modified);
    assert!(tracker.has_changes());

    assert!(tracker.detach(&avatar));
    assert_eq!(tracker.state_of(&avatar), EntityState::Detached);
    assert_eq!(ctx.db.save_changes().await.unwrap(), 0);
}

#[tokio::test]
async fn clear_discards_staged_changes() {
    let ctx = TestContext::new().await;
    FilmRepository::new(&ctx.db)
        .add(new_film("Titanic", 1997, 194))
        .await
        .unwrap();

    ctx.db.tracker().clear();
    assert!(ctx.db.tracker().entries().is_empty());
    assert_eq!(ctx.db.save_changes().await.unwrap(), 0);
    assert_eq!(ctx.film_count().await, 3);
}

#[tokio::test]
async fn save_changes_counts_affected_rows() {
    let ctx = TestContext::new().await;
    let films = FilmRepository::new(&ctx.db);

    films.add(new_film("Titanic", 1997, 194)).await.unwrap();
    films
        .update(
            1,
            film::Model {
                duration: 171,
                ..new_film("Avatar: Special Edition", 2010, 0)
            },
        )
        .await
        .unwrap();
    films.delete(3).await.unwrap();
    ctx.db.actors().add(actor::ActiveModel {
        lastname: Set("Lang".to_owned()),
        firstname: Set("Stephen".to_owned()),
        ..Default::default()
    });

    let states: Vec<_> = ctx.db.tracker().entries().into_iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        [
            EntityState::Added,
            EntityState::Modified,
            EntityState::Deleted,
            EntityState::Added
        ]
    );

    assert_eq!(ctx.db.save_changes().await.unwrap(), 4);
    assert!(!ctx.db.tracker().has_changes());
    assert_eq!(ctx.film_count().await, 3);
    assert_eq!(ctx.actor_count().await, 4);

    let avatar = films.get_by_id(1).await.unwrap().unwrap().film;
    assert_eq!(
        (avatar.title.as_str(), avatar.released_year, avatar.duration),
        ("Avatar: Special Edition", 2010, 171)
    );
}

#[tokio::test]
async fn transaction_commits_saved_changes() {
    let ctx = TestContext::new().await;

    let txn = ctx.db.begin().await.unwrap();
    FilmRepository::new(&txn)
        .add(new_film("Titanic", 1997, 194))
        .await
        .unwrap();
    assert_eq!(txn.save_changes().await.unwrap(), 1);
    txn.commit().await.unwrap();

    assert_eq!(ctx.film_count().await, 4);
}

#[tokio::test]
async fn transaction_rollback_undoes_saved_changes() {
    let ctx = TestContext::new().await;

    let txn = ctx.db.begin().await.unwrap();
    let films = FilmRepository::new(&txn);
    films.delete(1).await.unwrap();
    films.add(new_film("Titanic", 1997, 194)).await.unwrap();
    assert_eq!(txn.save_changes().await.unwrap(), 2);
    assert!(films.get_by_id(1).await.unwrap().is_none());
    txn.rollback().await.unwrap();

    assert_eq!(ctx.film_count().await, 3);
    let restored = film::Entity::find()
        .filter(film::Column::Title.eq("Avatar"))
        .one(ctx.db.connection())
        .await
        .unwrap();
    assert!(restored.is_some());
}

#[tokio::test]
async fn migrations_are_applied_once_on_connect() {
    let ctx = TestContext::new().await;
    assert!(ctx.db.can_connect().await);

    let report = ctx.db.migration_status().await.unwrap();
    assert_eq!(
        report.applied,
        [
            "m20260118_000001_create_catalog_tables",
            "m20260118_000002_create_film_actors_table",
            "m20260118_000003_seed_catalog",
        ]
    );
    assert!(report.pending.is_empty());

    ctx.db.ensure_schema().await.unwrap();
    assert_eq!(ctx.film_count().await, 3);
}

#[tokio::test]
async fn connecting_without_migrating_leaves_the_schema_pending() {
    let config = DatabaseConfig {
        migrate: false,
        ..DatabaseConfig::new("sqlite::memory:")
    };
    let ctx = DataContext::connect(&config).await.unwrap();

    let report = ctx.migration_status().await.unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.pending.len(), 3);
}

#[tokio::test]
async fn query_strings_inline_their_values() {
    let ctx = TestContext::new().await;
    let query = film::Entity::find().filter(film::Column::Id.eq(1));

    assert_eq!(
        ctx.db.to_query_string(&query),
        r#"SELECT "films"."id", "films"."title", "films"."released_year", "films"."duration", "films"."creator_id" FROM "films" WHERE "films"."id" = 1"#
    );
}

#[tokio::test]
async fn saved_rows_stay_tracked_as_unchanged() {
    let ctx = TestContext::new().await;
    let films = ctx.db.films();
    let avatar: film::ActiveModel = films
        .find_by_id(1)
        .one(ctx.db.connection())
        .await
        .unwrap()
        .unwrap()
        .into();
    films.attach(avatar.clone());

    FilmRepository::new(&ctx.db)
        .update(2, new_film("Avatar: The Way of Water", 2022, 192))
        .await
        .unwrap();
    assert_eq!(ctx.db.save_changes().await.unwrap(), 1);

    let tracker = ctx.db.tracker();
    assert_eq!(tracker.state_of(&avatar), EntityState::Unchanged);
    let sequel = film::ActiveModel {
        id: Set(2),
        ..Default::default()
    };
    assert_eq!(tracker.state_of(&sequel), EntityState::Unchanged);
    assert!(!tracker.has_changes());

    let titles: Vec<_> = tracker
        .models::<film::ActiveModel>()
        .into_iter()
        .map(|model| model.try_into_model().unwrap().title)
        .collect();
    assert_eq!(titles, ["Avatar", "Avatar: The Way of Water"]);
}

#[tokio::test]
async fn saved_inserts_keep_their_generated_key() {
    let ctx = TestContext::new().await;
    ctx.db.actors().add(actor::ActiveModel {
        lastname: Set("Lang".to_owned()),
        firstname: Set("Stephen".to_owned()),
        ..Default::default()
    });
    ctx.db.save_changes().await.unwrap();

    let entries = ctx.db.tracker().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "id=4");
    assert_eq!(entries[0].state, EntityState::Unchanged);

    let lang = ctx.db.tracker().models::<actor::ActiveModel>().pop().unwrap();
    assert_eq!(lang.try_into_model().unwrap().id, 4);
}

#[tokio::test]
async fn deleted_rows_are_forgotten_after_save() {
    let ctx = TestContext::new().await;
    let films = FilmRepository::new(&ctx.db);

    films.delete(3).await.unwrap();
    ctx.db.save_changes().await.unwrap();

    assert!(ctx.db.tracker().entries().is_empty());
}

#[tokio::test]
async fn updating_a_row_deleted_meanwhile_is_not_found() {
    let ctx = TestContext::new().await;
    FilmRepository::new(&ctx.db)
        .update(3, new_film("Avatar: Fire and Ash", 2025, 197))
        .await
        .unwrap();
    film::Entity::delete_by_id(3)
        .exec(ctx.db.connection())
        .await
        .unwrap();

    let err = ctx.db.save_changes().await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert_eq!(err.to_string(), "films with key id=3 was not found");
}

#[tokio::test]
async fn dropping_a_transaction_rolls_back() {
    let ctx = TestContext::new().await;
    {
        let txn = ctx.db.begin().await.unwrap();
        FilmRepository::new(&txn)
            .add(new_film("Titanic", 1997, 194))
            .await
            .unwrap();
        assert_eq!(txn.save_changes().await.unwrap(), 1);
    }

    assert_eq!(ctx.film_count().await, 3);
}

#[tokio::test]
async fn commit_discards_unsaved_changes() {
    let ctx = TestContext::new().await;

    let txn = ctx.db.begin().await.unwrap();
    FilmRepository::new(&txn)
        .add(new_film("Titanic", 1997, 194))
        .await
        .unwrap();
    assert!(txn.tracker().has_changes());
    txn.commit().await.unwrap();

    assert_eq!(ctx.film_count().await, 3);
    assert!(!ctx.db.tracker().has_changes());
}

#[tokio::test]
async fn reload_returns_a_modified_model_to_unchanged() {
    let ctx = TestContext::new().await;
    let films = ctx.db.films();
    let mut avatar: film::ActiveModel = films
        .find_by_id(1)
        .one(ctx.db.connection())
        .await
        .unwrap()
        .unwrap()
        .into();
    avatar.duration = Set(999);
    films.update(avatar.clone());
    assert_eq!(ctx.db.tracker().state_of(&avatar), EntityState::Modified);

    let reloaded = films.reload(&avatar).await.unwrap().unwrap();
    assert_eq!(reloaded.duration, Unchanged(162));
    assert_eq!(ctx.db.tracker().state_of(&avatar), EntityState::Unchanged);
    assert_eq!(ctx.db.tracker().entries().len(), 1);
    assert_eq!(ctx.db.save_changes().await.unwrap(), 0);

    let missing = film::ActiveModel {
        id: Set(42),
        ..Default::default()
    };
    assert_eq!(films.reload(&missing).await.unwrap(), None);
}
