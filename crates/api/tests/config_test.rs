use meetgrid_api::config::ApiConfig;

// Env-var mutation is process-wide, so everything lives in one test to
// avoid cross-test interference.
#[test]
fn test_config_from_env() {
    unsafe {
        std::env::set_var("DATABASE_URL", "postgres://localhost/meetgrid_test");
        std::env::set_var("MEETING_PROVIDER_URL", "https://provider.test/");
        std::env::set_var("API_PORT", "8123");
        std::env::set_var("API_CORS_ORIGINS", "https://a.test, https://b.test");
        std::env::set_var("MEETING_DURATION_MINUTES", "15");
    }

    let config = ApiConfig::from_env().expect("required variables set");

    assert_eq!(config.database_url, "postgres://localhost/meetgrid_test");
    assert_eq!(config.meeting_provider_url, "https://provider.test/");
    assert_eq!(config.port, 8123);
    assert_eq!(config.meeting_duration_minutes, 15);
    assert_eq!(
        config.cors_origins,
        Some(vec![
            "https://a.test".to_string(),
            "https://b.test".to_string()
        ])
    );
    assert_eq!(config.server_addr(), format!("{}:8123", config.host));
}
