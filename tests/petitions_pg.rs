use std::env;

use agora_db::prelude::*;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

// Requires a PostGIS-enabled server; set AGORA_PG_HOST (and optionally
// AGORA_PG_PORT/DB/USER/PASSWORD) to run.
fn pg_config_from_env() -> Option<deadpool_postgres::Config> {
    let host = env::var("AGORA_PG_HOST").ok()?;
    let mut cfg = deadpool_postgres::Config::new();
    cfg.host = Some(host);
    cfg.port = Some(
        env::var("AGORA_PG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
    );
    cfg.dbname = Some(env::var("AGORA_PG_DB").unwrap_or_else(|_| "testing".to_string()));
    cfg.user = Some(env::var("AGORA_PG_USER").unwrap_or_else(|_| "postgres".to_string()));
    cfg.password = Some(env::var("AGORA_PG_PASSWORD").unwrap_or_default());
    Some(cfg)
}

fn petition_input(city: Uuid, title: &str, location: Option<GeoPoint>) -> InsertPetitionInput {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    InsertPetitionInput {
        id: Uuid::new_v4(),
        city_id: city,
        title: title.to_string(),
        description: "test petition".to_string(),
        initiator_id: Uuid::new_v4(),
        address_to_id: None,
        status: "active".to_string(),
        signatures: 0,
        goal: 100,
        end_date: now + Duration::days(30),
        created_at: now,
        updated_at: now,
        location,
    }
}

#[test]
fn petitions_crud_geo_and_pagination() -> Result<(), Box<dyn std::error::Error>> {
    let Some(cfg) = pg_config_from_env() else {
        eprintln!("AGORA_PG_HOST not set; skipping");
        return Ok(());
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = Db::connect(cfg)?;
        let client = db.client().await?;
        client
            .batch_execute(
                "CREATE EXTENSION IF NOT EXISTS postgis;
                 DROP TABLE IF EXISTS petitions;
                 CREATE TABLE petitions (
                     id UUID PRIMARY KEY,
                     city_id UUID NOT NULL,
                     title TEXT NOT NULL,
                     description TEXT NOT NULL,
                     initiator_id UUID NOT NULL,
                     address_to_id UUID,
                     status TEXT NOT NULL,
                     signatures INT NOT NULL,
                     goal INT NOT NULL,
                     end_date TIMESTAMPTZ NOT NULL,
                     created_at TIMESTAMPTZ NOT NULL,
                     updated_at TIMESTAMPTZ NOT NULL,
                     location GEOMETRY(Point, 4326)
                 );",
            )
            .await?;
        drop(client);

        let petitions = PetitionsQ::new(db.clone());
        let city = Uuid::new_v4();

        // Insert/get round trip with a location.
        let located = petition_input(city, "located", Some(GeoPoint::new(50.45, 30.52)));
        petitions.insert(None, located.clone()).await?;
        let fetched = petitions.fresh().filter_id(located.id).get(None).await?;
        assert_eq!(fetched.id, located.id);
        assert_eq!(fetched.title, "located");
        assert_eq!(fetched.status, "active");
        assert_eq!(fetched.created_at, located.created_at);
        assert!((fetched.lat.unwrap() - 50.45).abs() < 1e-9);
        assert!((fetched.lng.unwrap() - 30.52).abs() < 1e-9);

        // A NULL location stays NULL on both derived coordinates. Creation
        // times are spaced so the ordered selection below is total.
        let mut unlocated = petition_input(city, "unlocated", None);
        unlocated.created_at += Duration::hours(1);
        petitions.insert(None, unlocated.clone()).await?;
        let fetched = petitions.fresh().filter_id(unlocated.id).get(None).await?;
        assert_eq!(fetched.lat, None);
        assert_eq!(fetched.lng, None);

        // Get on a random id is NotFound.
        let missing = petitions
            .fresh()
            .filter_id(Uuid::new_v4())
            .get(None)
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        // Pagination matches slicing the fully ordered selection.
        let mut third = petition_input(city, "third", None);
        third.created_at += Duration::hours(2);
        petitions.insert(None, third.clone()).await?;

        let by_city = petitions.fresh().filter_city_id(city);
        let all = by_city.clone().order_by_created_asc().select(None).await?;
        assert_eq!(all.len(), 3);
        let page = by_city
            .clone()
            .order_by_created_asc()
            .page(2, 1)
            .select(None)
            .await?;
        assert_eq!(page, all[1..3].to_vec());

        // Count ignores pagination and honors filters.
        assert_eq!(by_city.clone().page(1, 0).count(None).await?, 3);
        assert_eq!(
            petitions.fresh().filter_status("closed").count(None).await?,
            0
        );

        // Bounding box: a point exactly on the corner is included, a point
        // outside any edge is excluded.
        let on_boundary = petitions
            .fresh()
            .filter_city_id(city)
            .bbox(30.52, 50.45, 31.0, 51.0)
            .select(None)
            .await?;
        assert_eq!(on_boundary.len(), 1);
        assert_eq!(on_boundary[0].id, located.id);
        let outside = petitions
            .fresh()
            .filter_city_id(city)
            .bbox(31.0, 51.0, 32.0, 52.0)
            .select(None)
            .await?;
        assert!(outside.is_empty());

        // Radius: distance zero is within radius zero (boundary-inclusive);
        // a point ~111 m away is outside a 50 m radius and inside 200 m.
        let at_center = petitions
            .fresh()
            .within_radius(30.52, 50.45, 0.0)
            .select(None)
            .await?;
        assert_eq!(at_center.len(), 1);
        let near = petitions
            .fresh()
            .within_radius(30.52, 50.451, 200.0)
            .select(None)
            .await?;
        assert_eq!(near.len(), 1);
        let too_far = petitions
            .fresh()
            .within_radius(30.52, 50.451, 50.0)
            .select(None)
            .await?;
        assert!(too_far.is_empty());

        // Partial update with the tri-state addressee.
        let addressee = Uuid::new_v4();
        petitions
            .fresh()
            .filter_id(located.id)
            .update(
                None,
                UpdatePetitionInput {
                    title: Some("renamed".to_string()),
                    address_to_id: Setter::Set(addressee),
                    ..Default::default()
                },
            )
            .await?;
        let updated = petitions.fresh().filter_id(located.id).get(None).await?;
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.address_to_id, Some(addressee));
        assert_eq!(updated.description, located.description);

        petitions
            .fresh()
            .filter_id(located.id)
            .update(
                None,
                UpdatePetitionInput {
                    address_to_id: Setter::Null,
                    ..Default::default()
                },
            )
            .await?;
        let cleared = petitions.fresh().filter_id(located.id).get(None).await?;
        assert_eq!(cleared.address_to_id, None);

        // An empty update is a no-op and leaves the row untouched.
        petitions
            .fresh()
            .filter_id(located.id)
            .update(None, UpdatePetitionInput::default())
            .await?;
        let untouched = petitions.fresh().filter_id(located.id).get(None).await?;
        assert_eq!(untouched, cleared);

        // Signature counter clamps at zero.
        let scoped = petitions.fresh().filter_id(located.id);
        scoped.increment_signatures(None, 3).await?;
        assert_eq!(scoped.get(None).await?.signatures, 3);
        scoped.increment_signatures(None, -100).await?;
        assert_eq!(scoped.get(None).await?.signatures, 0);

        // An unfiltered delete removes every row.
        petitions.fresh().delete(None).await?;
        assert_eq!(petitions.fresh().count(None).await?, 0);

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
