use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber used by every tool.
///
/// `RUST_LOG` wins when set; otherwise the forum crates log at `info`.
pub fn init() -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive("forum_common=info".parse()?)
            .add_directive("forum_migrate=info".parse()?)
            .add_directive("forum_fix=info".parse()?)
            .add_directive("forum_smoke=info".parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
