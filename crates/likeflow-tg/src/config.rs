use crate::{instagram, pipeline, tg};
use serde::de::DeserializeOwned;

pub struct Config {
    pub(crate) tg: tg::Config,
    pub(crate) admin: tg::AdminConfig,
    pub(crate) instagram: instagram::Config,
    pub(crate) pipeline: pipeline::Config,
}

impl Config {
    pub fn load_or_panic() -> Config {
        Self {
            tg: from_env_or_panic("TG_"),
            admin: from_env_or_panic("ADMIN_"),
            instagram: from_env_or_panic("INSTAGRAM_"),
            pipeline: from_env_or_panic("PIPELINE_"),
        }
    }
}

pub(crate) fn from_env_or_panic<T: DeserializeOwned>(prefix: &str) -> T {
    envy::prefixed(prefix).from_env().unwrap_or_else(|err| {
        panic!(
            "BUG: Couldn't load config from environment for {}: {:#?}",
            std::any::type_name::<T>(),
            err
        );
    })
}
