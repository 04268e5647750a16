use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fibreg_core::io::FileSequence;
use fibreg_core::preprocess::{classify_polarity, foreground_extent};

#[derive(Args)]
pub struct InfoArgs {
    /// Directory with the slices
    pub dir: PathBuf,

    /// Slice file extension
    #[arg(long, default_value = "tif")]
    pub extension: String,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let sequence = FileSequence::resolve(&args.dir, &args.extension, 0, None)
        .with_context(|| format!("Failed to list {}", args.dir.display()))?;

    println!("Directory:   {}", args.dir.display());
    println!("Slices:      {}", sequence.len());
    if sequence.is_empty() {
        return Ok(());
    }

    let first = sequence.read_frame(0)?;
    let name = |i: usize| {
        sequence
            .get(i)
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    println!("First:       {}", name(0));
    println!("Last:        {}", name(sequence.len() - 1));
    println!("Dimensions:  {}x{}", first.width(), first.height());

    let polarity = classify_polarity(&sequence)?;
    println!("Polarity:    {}", polarity);
    match foreground_extent(&first.data, polarity) {
        Some(extent) => println!("Content:     {}", extent),
        None => println!("Content:     none in first slice"),
    }

    Ok(())
}
