use bloomloop::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,bloomloop=info"))
        .init();

    let config = Config::load();
    bloomloop::run(config)?;
    Ok(())
}
