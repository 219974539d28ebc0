// Runs against the database in DATABASE_URL:
//   cargo test --test 60_postgres_store -- --ignored

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use trail_service::config::AppConfig;
use trail_service::database::models::{NewLocation, NewPoint, NewTrail, TrailChanges};
use trail_service::database::{DatabaseError, DatabaseManager, PgTrailStore, TrailStore};

async fn store() -> Result<PgTrailStore> {
    let _ = dotenvy::dotenv();
    let mut config = AppConfig::development().database;
    config.url = Some(std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?);

    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(PgTrailStore::new(pool))
}

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

fn point(latitude: f64, longitude: f64, description: Option<&str>) -> NewPoint {
    NewPoint {
        latitude,
        longitude,
        description: description.map(str::to_string),
    }
}

fn new_trail(name: &str) -> NewTrail {
    NewTrail {
        name: name.to_string(),
        difficulty: "Moderate".to_string(),
        rating: Decimal::new(45, 1),
        length: Decimal::new(123, 1),
        elevation_gain: 320,
        route_type: "Loop".to_string(),
        completion_time: Some(180),
        description: "Coastal path".to_string(),
        location: NewLocation {
            city: "Plymouth".to_string(),
            county: "Devon".to_string(),
            country: "England".to_string(),
        },
        points: vec![point(50.3755, -4.1427, Some("Start")), point(50.3621, -4.1580, None)],
        tags: vec!["coastal".to_string(), "dog-friendly".to_string()],
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn create_update_delete_round_trip() -> Result<()> {
    let store = store().await?;
    let owner = store.find_or_create_user(&format!("{}@example.com", unique("pg").replace(' ', "."))).await?;
    let name = unique("Pg Round Trip");

    let created = store.create_trail(owner.user_id, &new_trail(&name)).await?;
    assert_eq!(created.record.rating, Decimal::new(45, 1));
    assert_eq!(created.points.len(), 2);
    assert_eq!(created.points[0].sequence_number, 1);
    assert_eq!(created.points[1].description, None);
    assert_eq!(created.tags, vec!["coastal", "dog-friendly"]);

    let fetched = store.find_trail_by_name(&name).await?.context("trail should exist")?;
    assert_eq!(fetched, created);

    let changes = TrailChanges {
        difficulty: Some("Hard".to_string()),
        completion_time: Some(None),
        points: Some(vec![point(50.57, -3.92, Some("Haytor"))]),
        tags: Some(vec![]),
        ..TrailChanges::default()
    };
    let updated = store.update_trail(created.trail_id(), &changes).await?;
    assert_eq!(updated.record.difficulty, "Hard");
    assert_eq!(updated.record.completion_time, None);
    assert_eq!(updated.record.location_id, created.record.location_id);
    assert_eq!(updated.points.len(), 1);
    assert_eq!(updated.points[0].sequence_number, 1);
    assert!(updated.tags.is_empty());

    store.delete_trail(created.trail_id()).await?;
    assert!(store.find_trail_by_name(&name).await?.is_none());
    assert!(matches!(
        store.delete_trail(created.trail_id()).await,
        Err(DatabaseError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_name_rolls_back() -> Result<()> {
    let store = store().await?;
    let owner = store.find_or_create_user("pg-duplicate@example.com").await?;
    let name = unique("Pg Duplicate");

    let first = store.create_trail(owner.user_id, &new_trail(&name)).await?;
    let second = store.create_trail(owner.user_id, &new_trail(&name)).await;
    assert!(matches!(second, Err(DatabaseError::Conflict(_))), "got {:?}", second.map(|t| t.trail_id()));

    // The surviving trail still has only its own points
    let fetched = store.find_trail_by_name(&name).await?.context("trail should exist")?;
    assert_eq!(fetched.trail_id(), first.trail_id());
    assert_eq!(fetched.points.len(), 2);

    store.delete_trail(first.trail_id()).await?;
    Ok(())
}
