use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points `STATPANEL_CONFIG_HOME` at a test directory until dropped.
pub struct StatpanelEnvGuard {
    previous: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl StatpanelEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = std::env::var("STATPANEL_CONFIG_HOME").ok();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var("STATPANEL_CONFIG_HOME", path);
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for StatpanelEnvGuard {
    fn drop(&mut self) {
        // SAFETY: the guard still holds the global lock.
        unsafe {
            match self.previous.take() {
                Some(value) => std::env::set_var("STATPANEL_CONFIG_HOME", value),
                None => std::env::remove_var("STATPANEL_CONFIG_HOME"),
            }
        }
    }
}
