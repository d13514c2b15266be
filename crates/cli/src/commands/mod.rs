pub mod ask;
pub mod memory;
pub mod onboard;
pub mod run;
pub mod tool;

use forgecore_config::AppConfig;
use forgecore_core::Error;

pub(crate) fn load_config() -> Result<AppConfig, Error> {
    AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })
}
