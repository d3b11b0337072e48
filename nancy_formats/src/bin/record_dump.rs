use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use nancy_formats::{RecordBody, ScriptSegment, SegmentEntry};
use serde::Serialize;
use walkdir::WalkDir;

/// List the action records stored in one or more script segment files.
#[derive(Parser)]
struct Args {
    /// Segment files, or directories when `--recursive` is given
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Walk directories and dump every file with the segment extension
    #[arg(long)]
    recursive: bool,

    /// File extension treated as a script segment while walking
    #[arg(long, default_value = "act")]
    extension: String,

    /// Emit a JSON manifest instead of the table
    #[arg(long)]
    json: bool,

    /// Include decoded record bodies in the JSON manifest
    #[arg(long, requires = "json")]
    bodies: bool,
}

#[derive(Serialize)]
struct SegmentManifest<'a> {
    path: String,
    byte_len: u64,
    records: Vec<RecordSummary<'a>>,
}

#[derive(Serialize)]
struct RecordSummary<'a> {
    index: usize,
    kind: &'static str,
    tag: u8,
    offset: u64,
    len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a RecordBody>,
}

impl<'a> RecordSummary<'a> {
    fn new(entry: &'a SegmentEntry, include_body: bool) -> Self {
        RecordSummary {
            index: entry.index,
            kind: entry.kind.name(),
            tag: entry.tag,
            offset: entry.offset,
            len: entry.len,
            body: include_body.then_some(&entry.body),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let files = collect_files(&args)?;

    let mut segments = Vec::with_capacity(files.len());
    for path in &files {
        let segment = ScriptSegment::open(path)?;
        segments.push((path, segment));
    }

    if args.json {
        let manifests: Vec<SegmentManifest<'_>> = segments
            .iter()
            .map(|(path, segment)| SegmentManifest {
                path: path.display().to_string(),
                byte_len: segment.byte_len(),
                records: segment
                    .entries()
                    .iter()
                    .map(|entry| RecordSummary::new(entry, args.bodies))
                    .collect(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&manifests)
            .context("serializing segment manifest to JSON")?;
        println!("{json}");
        return Ok(());
    }

    for (path, segment) in &segments {
        println!(
            "{} records ({} bytes) in {}",
            segment.len(),
            segment.byte_len(),
            path.display()
        );
        for entry in segment.entries() {
            println!(
                "{index:>4}  {tag:#04x}  {kind:<32} {offset:>8} {len:>6}{detail}",
                index = entry.index,
                tag = entry.tag,
                kind = entry.kind.name(),
                offset = entry.offset,
                len = entry.len,
                detail = describe(&entry.body)
            );
        }
    }
    Ok(())
}

fn collect_files(args: &Args) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in &args.paths {
        if path.is_dir() {
            if !args.recursive {
                bail!("{} is a directory; pass --recursive to walk it", path.display());
            }
            walk_segments(path, &args.extension, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk_segments(root: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if entry.file_type().is_file() && matches {
            files.push(entry.into_path());
        }
    }
    Ok(())
}

fn describe(body: &RecordBody) -> String {
    match body {
        RecordBody::SceneChange(scene) => format!(
            "  -> scene {} frame {} scroll {}",
            scene.scene_id, scene.frame_id, scene.vertical_offset
        ),
        RecordBody::Hot1FrSceneChange(hot) => format!(
            "  -> scene {} via hotspot on frame {}",
            hot.scene.scene_id, hot.hotspot.frame_id
        ),
        RecordBody::EventFlags(flags) => format!("  {} flags", flags.applied().count()),
        RecordBody::EventFlagsMultiHs(multi) => format!(
            "  {} flags, {} hotspots",
            multi.flags.applied().count(),
            multi.hotspots.len()
        ),
        RecordBody::DifficultyLevel(level) => format!("  difficulty {}", level.difficulty),
        RecordBody::PrimaryVideo(video) => format!(
            "  {} responses, {} flag groups",
            video.responses.len(),
            video.flags_structs.len()
        ),
        RecordBody::BitmapAnimation(anim) => format!("  {} frames", anim.frame_count()),
        RecordBody::TextBoxWrite(text) => format!("  {:?}", text.text()),
        RecordBody::Telephone(phone) => format!("  {} entries", phone.entry_count()),
        RecordBody::Byte { .. } | RecordBody::Empty | RecordBody::Opaque { .. } => String::new(),
    }
}
