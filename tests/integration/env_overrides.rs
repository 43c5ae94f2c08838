//! Integration tests for environment override resolution and precedence.

use super::test_utils::{registry_with_prefix, with_env, RunMode, ServerConfig};
use strata::{ConfigRegistry, RegistryOptions};
use tempfile::TempDir;

#[test]
fn test_env_wins_over_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "port = 9999\n")?;

    let registry = registry_with_prefix("STRATA_EO_A");
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_A_SERVER_PORT", "7777")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.port, 7777);
    Ok(())
}

#[test]
fn test_file_wins_over_default() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "port = 9999\n")?;

    let registry = registry_with_prefix("STRATA_EO_B");
    registry.register::<ServerConfig>(&path)?;
    let value = registry.load::<ServerConfig>()?;
    assert_eq!(value.port, 9999);
    Ok(())
}

#[test]
fn test_default_when_neither_layer_present() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_C");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;
    let value = registry.load::<ServerConfig>()?;
    assert_eq!(value.port, 8080);
    Ok(())
}

#[test]
fn test_nested_field_env_key() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_D");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;

    let value = with_env(
        &[("STRATA_EO_D_SERVER_LIMITS_MAX_CONNECTIONS", "512")],
        || registry.load::<ServerConfig>(),
    )?;
    assert_eq!(value.limits.max_connections, 512);
    assert_eq!(value.limits.burst, 8);
    Ok(())
}

#[test]
fn test_partial_override_keeps_sibling_from_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "host = \"files.example\"\nport = 9999\n")?;

    let registry = registry_with_prefix("STRATA_EO_E");
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_E_SERVER_PORT", "7777")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.port, 7777);
    assert_eq!(value.host, "files.example");
    Ok(())
}

#[test]
fn test_enum_override_is_case_insensitive() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_F");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;

    let value = with_env(&[("STRATA_EO_F_SERVER_MODE", "production")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.mode, RunMode::Production);
    Ok(())
}

#[test]
fn test_bool_accepts_numeric_forms() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_G");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;

    let value = with_env(&[("STRATA_EO_G_SERVER_DEBUG", "1")], || {
        registry.load::<ServerConfig>()
    })?;
    assert!(value.debug);
    Ok(())
}

#[test]
fn test_float_override() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_H");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;

    let value = with_env(&[("STRATA_EO_H_SERVER_SAMPLE_RATE", "0.25")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.sample_rate, 0.25);
    Ok(())
}

#[test]
fn test_invalid_int_keeps_file_value() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "port = 9999\n")?;

    let registry = registry_with_prefix("STRATA_EO_I");
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_I_SERVER_PORT", "lots")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.port, 9999);
    Ok(())
}

#[test]
fn test_invalid_enum_keeps_prior_value() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "mode = \"Staging\"\n")?;

    let registry = registry_with_prefix("STRATA_EO_J");
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_J_SERVER_MODE", "warp-speed")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.mode, RunMode::Staging);
    Ok(())
}

#[test]
fn test_env_populates_omitted_nested_block() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    // no [limits] block at all
    std::fs::write(&path, "host = \"files.example\"\n")?;

    let registry = registry_with_prefix("STRATA_EO_K");
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_K_SERVER_LIMITS_BURST", "99")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.limits.burst, 99);
    assert_eq!(value.limits.max_connections, 64);
    Ok(())
}

#[test]
fn test_string_override_taken_verbatim() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let registry = registry_with_prefix("STRATA_EO_L");
    registry.register::<ServerConfig>(temp.path().join("server.toml"))?;

    let value = with_env(&[("STRATA_EO_L_SERVER_HOST", "override.example")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.host, "override.example");
    Ok(())
}

#[test]
fn test_disabled_overrides_ignore_environment() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "port = 9999\n")?;

    let registry = ConfigRegistry::with_options(RegistryOptions {
        env_prefix: "STRATA_EO_M".to_string(),
        env_overrides: false,
    });
    registry.register::<ServerConfig>(&path)?;
    let value = with_env(&[("STRATA_EO_M_SERVER_PORT", "7777")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.port, 9999);
    Ok(())
}

#[test]
fn test_out_of_range_override_degrades_to_file_value() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("server.toml");
    std::fs::write(&path, "port = 9999\n")?;

    let registry = registry_with_prefix("STRATA_EO_N");
    registry.register::<ServerConfig>(&path)?;
    // parses as i64 but overflows the u16 port field
    let value = with_env(&[("STRATA_EO_N_SERVER_PORT", "99999999")], || {
        registry.load::<ServerConfig>()
    })?;
    assert_eq!(value.port, 9999);
    Ok(())
}
