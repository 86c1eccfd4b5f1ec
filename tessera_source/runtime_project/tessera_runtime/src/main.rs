use anyhow::{Context, bail};
use std::env;
use std::path::PathBuf;
use tessera_project::{RuntimeConfig, load_runtime_config, load_runtime_toml};
use tessera_runtime::GameSession;

struct Args {
    path: PathBuf,
    config: Option<PathBuf>,
    scene: Option<String>,
    frames: u32,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        path: env::current_dir().context("no working directory")?,
        config: None,
        scene: None,
        frames: 60,
    };
    let mut iter = env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("`{flag}` expects a value"))
        };
        match flag.as_str() {
            "--path" => args.path = PathBuf::from(value()?),
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--scene" => args.scene = Some(value()?),
            "--frames" => {
                args.frames = value()?
                    .parse::<u32>()
                    .context("`--frames` expects a whole number")?
            }
            other => bail!("unknown argument `{other}`"),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> anyhow::Result<RuntimeConfig> {
    let config = match &args.config {
        Some(path) => load_runtime_toml(path)?.rooted_at(&args.path),
        None => load_runtime_config(&args.path)?,
    };
    Ok(config)
}

async fn run(args: Args, config: RuntimeConfig) -> anyhow::Result<()> {
    let session = GameSession::from_config(&config)?;
    session.init().await?;

    match &args.scene {
        Some(scene) => {
            session.load_scene(scene).await?;
            session.play().await?;
        }
        None => session.play().await?,
    }

    if let Some(tree) = session.with_scene(|scene| scene.describe_tree()) {
        print!("{tree}");
    }

    let mut steps = 0;
    for _ in 0..args.frames {
        steps += session.update(config.timestep);
    }
    log::info!("ran {} frame(s), {steps} physics step(s)", args.frames);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = load_config(&args)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    println!("Running project at {:?}", args.path);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args, config))
}
