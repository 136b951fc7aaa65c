use std::collections::HashMap;

use super::*;

fn test_config() -> revmig_core::AppConfig {
    let vars: HashMap<&str, &str> = [
        ("AIRTABLE_API_TOKEN", "pat-test"),
        ("AIRTABLE_BASE_ID", "appBase"),
        ("AIRTABLE_TABLE_NAME", "Reviews"),
        ("GOOGLE_MAPS_API_KEY", "maps-key"),
        ("FIREBASE_PROJECT_ID", "access-map"),
        ("FIREBASE_STORAGE_BUCKET", "access-map.appspot.com"),
        (
            "FIREBASE_SERVICE_ACCOUNT_EMAIL",
            "migrator@access-map.iam.gserviceaccount.com",
        ),
        ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.test"),
    ]
    .into_iter()
    .collect();
    revmig_core::build_app_config(|key| {
        vars.get(key)
            .map(|v| (*v).to_string())
            .ok_or(std::env::VarError::NotPresent)
    })
    .expect("test config should load")
}

#[test]
fn parses_migrate_with_defaults() {
    let cli = Cli::try_parse_from(["revmig", "migrate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Migrate {
            limit: None,
            dry_run: false,
            write_mode: None,
            default_rating: None,
        }
    ));
}

#[test]
fn parses_migrate_overrides() {
    let cli = Cli::try_parse_from([
        "revmig",
        "migrate",
        "--limit",
        "10",
        "--dry-run",
        "--write-mode",
        "batched",
        "--default-rating",
        "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Migrate {
            limit,
            dry_run,
            write_mode,
            default_rating,
        } => {
            assert_eq!(limit, Some(10));
            assert!(dry_run);
            assert_eq!(write_mode, Some(WriteMode::Batched));
            assert_eq!(default_rating, Some(5.0));
        }
        other => panic!("expected migrate, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_write_mode() {
    let result = Cli::try_parse_from(["revmig", "migrate", "--write-mode", "eventually"]);
    assert!(result.is_err());
}

#[test]
fn rejects_out_of_range_rating() {
    let result = Cli::try_parse_from(["revmig", "migrate", "--default-rating", "7"]);
    assert!(result.is_err());
}

#[test]
fn parses_resolve_command() {
    let cli = Cli::try_parse_from([
        "revmig",
        "resolve",
        "--name",
        "Cafe A",
        "--address",
        "1 Main St",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Resolve { ref name, ref address } if name == "Cafe A" && address == "1 Main St"
    ));
}

#[test]
fn resolve_requires_address() {
    assert!(Cli::try_parse_from(["revmig", "resolve", "--name", "Cafe A"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["revmig"]).is_err());
}

#[test]
fn migration_options_fall_back_to_config() {
    let config = test_config();
    let options = migrate::migration_options(&config, &migrate::MigrateArgs::default());
    assert_eq!(options.write_mode, WriteMode::Immediate);
    assert_eq!(options.limit, None);
    assert!(!options.dry_run);
    assert!((options.review_defaults.default_rating - 3.0).abs() < f64::EPSILON);
    assert_eq!(options.review_defaults.legacy_user_name, "Legacy Review");
}

#[test]
fn migration_options_prefer_cli_overrides() {
    let config = test_config();
    let args = migrate::MigrateArgs {
        limit: Some(2),
        dry_run: true,
        write_mode: Some(WriteMode::Batched),
        default_rating: Some(5.0),
    };
    let options = migrate::migration_options(&config, &args);
    assert_eq!(options.write_mode, WriteMode::Batched);
    assert_eq!(options.limit, Some(2));
    assert!(options.dry_run);
    assert!((options.review_defaults.default_rating - 5.0).abs() < f64::EPSILON);
}

#[test]
fn retry_policy_follows_config() {
    let config = test_config();
    let policy = clients::retry_policy(&config);
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.backoff_base_ms, 1_000);
}

#[test]
fn places_client_builds_from_maps_key_alone() {
    let config = revmig_core::build_places_config(|key| match key {
        "GOOGLE_MAPS_API_KEY" => Ok("maps-key".to_string()),
        _ => Err(std::env::VarError::NotPresent),
    })
    .expect("maps key alone should be enough");
    assert!(clients::build_places_client(&config).is_ok());
}

#[test]
fn places_client_from_full_config_keeps_transport_settings() {
    let config = test_config().places_config();
    assert_eq!(config.google_maps_api_key, "maps-key");
    assert_eq!(config.request_timeout_secs, 30);
    assert!(clients::build_places_client(&config).is_ok());
}
