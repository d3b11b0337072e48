use std::fs;

use anyhow::{Context, Result};
use nancy_engine::{ActionManager, PlayState, SegmentStatus};
use nancy_formats::ScriptSegment;

mod cli;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;

    let segment = ScriptSegment::open(&args.script)?;
    let mut play = match &args.state {
        Some(path) => PlayState::from_json_file(path).context("seeding play state")?,
        None => PlayState::default(),
    };
    if let Some(frame) = args.view_frame {
        play.current_view_frame = frame;
    }

    let mut manager = ActionManager::new();
    let loaded = manager.load_segment(&segment);
    println!(
        "Loaded {loaded} action records from {}",
        args.script.display()
    );

    for tick in 1..=args.ticks {
        let status = manager.tick(&mut play);
        play.advance_timer(args.tick_ms);
        println!(
            "tick {tick}: {} pending, {} live hotspots",
            manager.pending(),
            manager.live_hotspots().len()
        );

        if tick == args.click_tick {
            if let Some((x, y)) = args.click {
                match manager.click(x, y) {
                    Some(index) => println!(
                        "click ({x}, {y}) -> record {index} ({})",
                        manager.records()[index].kind().name()
                    ),
                    None => println!("click ({x}, {y}) hit no live hotspot"),
                }
            }
        }

        if status == SegmentStatus::Finished {
            println!("segment finished after {tick} ticks");
            break;
        }
    }

    println!(
        "scene {} (load pending: {}), view frame {}, {} event flags set, difficulty {}",
        play.scene.scene_id,
        play.scene.load_pending,
        play.queued_view_frame,
        play.event_flags.len(),
        play.difficulty
    );

    if let Some(path) = &args.state_json {
        let json = serde_json::to_string_pretty(&play).context("serializing play state")?;
        fs::write(path, json)
            .with_context(|| format!("writing play state to {}", path.display()))?;
        println!("Play state written to {}", path.display());
    }
    Ok(())
}
