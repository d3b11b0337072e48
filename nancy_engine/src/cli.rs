use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Play back an action-record script segment against a simulated play state",
    version
)]
pub struct Args {
    /// Script segment to load (`[tag][payload]` records back to back)
    #[arg(long)]
    pub script: PathBuf,

    /// Optional JSON file seeding the play state before the first tick
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Override the current view frame before the first tick
    #[arg(long)]
    pub view_frame: Option<u16>,

    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 1)]
    pub ticks: u32,

    /// Milliseconds the player timer advances per tick
    #[arg(long, default_value_t = 0)]
    pub tick_ms: u64,

    /// Click at X,Y once `--click-tick` ticks have run
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    pub click: Option<(i32, i32)>,

    /// Tick after which the click is delivered
    #[arg(long, default_value_t = 1)]
    pub click_tick: u32,

    /// Path to write the final play state as JSON
    #[arg(long)]
    pub state_json: Option<PathBuf>,
}

pub fn parse() -> Result<Args> {
    let args = Args::parse();
    args.validate()?;
    Ok(args)
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.ticks == 0 {
            bail!("--ticks must be at least 1");
        }
        if self.click.is_some() && (self.click_tick == 0 || self.click_tick > self.ticks) {
            bail!(
                "--click-tick {} is outside the 1..={} tick range",
                self.click_tick,
                self.ticks
            );
        }
        Ok(())
    }
}

fn parse_point(raw: &str) -> Result<(i32, i32)> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("expected X,Y, got {raw:?}"))?;
    let x = x.trim().parse().with_context(|| format!("invalid x in {raw:?}"))?;
    let y = y.trim().parse().with_context(|| format!("invalid y in {raw:?}"))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_click_points() {
        assert_eq!(parse_point("12,34").unwrap(), (12, 34));
        assert_eq!(parse_point(" -1 , 7").unwrap(), (-1, 7));
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn click_tick_must_fall_within_run() {
        let args = Args::try_parse_from([
            "nancy_engine",
            "--script",
            "scene.act",
            "--ticks",
            "2",
            "--click",
            "5,5",
            "--click-tick",
            "3",
        ])
        .unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["nancy_engine", "--script", "scene.act"]).unwrap();
        assert_eq!(args.ticks, 1);
        assert!(args.validate().is_ok());
    }
}
