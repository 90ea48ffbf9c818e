use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use log::info;
use serde::Deserialize;
use solver::{find_path, render, GridMap, MazeError, RenderConfig, Strategy};

/// Optional overrides, read from the working directory when present
const CONFIG_FILE: &str = "mazepath.json";

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    input: PathBuf,
    output_dir: PathBuf,
    draw_plain_maze: bool,
    /// Searches to run, in order
    strategies: Vec<Strategy>,
    render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("mazes/maze4.txt"),
            output_dir: PathBuf::from("."),
            draw_plain_maze: false,
            strategies: vec![Strategy::BreadthFirst, Strategy::DepthFirst],
            render: RenderConfig::default(),
        }
    }
}

fn load_config() -> Result<Config, anyhow::Error> {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }

    let text = fs::read_to_string(path).with_context(|| format!("reading {}", CONFIG_FILE))?;
    let config = serde_json::from_str(&text).with_context(|| format!("parsing {}", CONFIG_FILE))?;
    info!("loaded configuration from {}", CONFIG_FILE);
    Ok(config)
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let map = GridMap::from_file(&config.input)
        .with_context(|| format!("loading maze {}", config.input.display()))?;
    let (start, goal) = map.find_markers()?;

    println!("{}", map);

    if config.draw_plain_maze {
        let dest = config.output_dir.join("maze.png");
        render::draw_maze(&map, start, goal, &config.render, &dest)?;
        info!("wrote {}", dest.display());
    }

    for &strategy in &config.strategies {
        let label = strategy.to_string().to_uppercase();

        let timer = Instant::now();
        let res = find_path(&map, start, goal, strategy);
        let elapsed = timer.elapsed();

        let found = match res {
            Ok(found) => found,
            Err(MazeError::NoPathFound { .. }) => {
                println!("{} found no path", label);
                println!("Time taken: {} secs", elapsed.as_secs_f64());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        println!("{} distance: {}", label, found.path.len());
        println!("Time taken: {} secs", elapsed.as_secs_f64());
        println!("{}", map.with_path(&found.path));

        let dest = config.output_dir.join(format!("{}_maze.png", strategy));
        render::draw_path(&map, &found.path, start, goal, &config.render, &dest)
            .with_context(|| format!("writing {}", dest.display()))?;
        info!("wrote {}", dest.display());
    }

    Ok(())
}
