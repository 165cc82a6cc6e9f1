use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    pub webhook_secret: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Ok(AppConfig::init_from_env()?)
    }
}
