mod support;

use statpanel::app_dirs;
use statpanel::config::{self, PanelConfig};
use support::statpanel_env::StatpanelEnvGuard;
use tempfile::tempdir;

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let _guard = StatpanelEnvGuard::set_config_home(dir.path().to_path_buf());
    let path = config::config_path().unwrap();
    assert!(path.starts_with(dir.path().join(app_dirs::APP_DIR_NAME)));
    assert_eq!(config::load_or_default().unwrap(), PanelConfig::default());
}

#[test]
fn saved_config_is_picked_up_from_app_dir() {
    let dir = tempdir().unwrap();
    let _guard = StatpanelEnvGuard::set_config_home(dir.path().to_path_buf());
    let mut config = PanelConfig::default();
    config.alpha = 0.01;
    config.split.seed = 99;
    config::save_to_path(&config, &config::config_path().unwrap()).unwrap();
    assert_eq!(config::load_or_default().unwrap(), config);
}
