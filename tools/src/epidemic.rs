use crate::fetch;
use anyhow::{Context, Result};
use moodgraph_core::{open_store, update_history, EpidemicData, MergeMode, EPIDEMIC_INDEX};
use std::path::Path;

pub fn run(input: &str, history: &Path, mode: MergeMode) -> Result<()> {
    let data = if fetch::is_url(input) {
        let body = fetch::download(input)?;
        EpidemicData::from_reader(body.as_slice())?
    } else {
        EpidemicData::from_path(input).with_context(|| format!("read {input}"))?
    };

    let store = open_store(history, EPIDEMIC_INDEX)?;
    let existing = store.read()?;
    let table = update_history(&data, existing, mode)?;
    store
        .write(&table)
        .with_context(|| format!("write {}", history.display()))?;
    println!(
        "Epidemic history {} now holds {} days x {} metrics",
        history.display(),
        table.len(),
        table.rows().len()
    );
    Ok(())
}
