use ionman_dns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(config_path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        proxy = %format!("{}:{}", config.proxy.listen_addr, config.proxy.listen_port),
        resolver = %format!("{}:{}", config.resolver.listen_addr, config.resolver.listen_port),
        upstream = %format!("{}:{}", config.proxy.upstream_addr, config.proxy.upstream_port),
        "Configuration loaded"
    );

    Ok(config)
}
