use anyhow::{Context, Result};
use moodgraph_core::{buckets, open_store, Config, EmotionPipeline, Lexicon, MergeMode, EMOTION_INDEX};

pub fn run(config: &Config, mode: MergeMode, dry_run: bool) -> Result<()> {
    let paths = &config.paths;
    let lexicon = Lexicon::load(&paths.lexicon)
        .with_context(|| format!("load lexicon {}", paths.lexicon.display()))?;
    let days = buckets::load(&paths.day_buckets)
        .with_context(|| format!("load day buckets {}", paths.day_buckets.display()))?;
    let pipeline = EmotionPipeline::new(lexicon, config.scoring.clone())?;

    if dry_run {
        let table = pipeline.score_only(&days)?;
        for (day, column) in table.columns() {
            println!("{day} {}", serde_json::to_string(column)?);
        }
        return Ok(());
    }

    let store = open_store(&paths.emotion_history, EMOTION_INDEX)?;
    let table = pipeline
        .run(&days, mode, store.as_ref())
        .with_context(|| format!("update {}", paths.emotion_history.display()))?;
    println!(
        "Emotion history {} now holds {} days",
        paths.emotion_history.display(),
        table.len()
    );
    Ok(())
}
