use anyhow::{Context, Result};
use chrono::NaiveDate;
use moodgraph_core::{
    buckets, open_store, ChartSeries, Config, DayTable, EmotionPipeline, Lexicon, EMOTION_INDEX,
    EPIDEMIC_INDEX,
};
use std::path::Path;

/// Where the emotion side of the chart comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionSource {
    /// The saved emotion history.
    History,
    /// Day buckets scored in memory; nothing is written.
    Buckets,
}

pub fn run(
    config: &Config,
    source: EmotionSource,
    emotion: &str,
    metric: &str,
    range: Option<(NaiveDate, NaiveDate)>,
    out: &Path,
) -> Result<()> {
    let paths = &config.paths;
    let emotions = match source {
        EmotionSource::History => open_store(&paths.emotion_history, EMOTION_INDEX)?.read()?,
        EmotionSource::Buckets => score_buckets(config, range)?,
    };
    let epidemic = open_store(&paths.epidemic_history, EPIDEMIC_INDEX)?.read()?;

    let series = match range {
        Some((start, end)) => ChartSeries::build(&emotions, &epidemic, emotion, metric, start, end)?,
        None => ChartSeries::from_saved(&emotions, &epidemic, emotion, metric)
            .context("no emotion data; pass --start and --end or run `score` first")?,
    };

    let is_json = out.extension().and_then(|e| e.to_str()) == Some("json");
    let body = if is_json {
        serde_json::to_string_pretty(&series.to_figure_json())?
    } else {
        series.to_html()
    };
    std::fs::write(out, body).with_context(|| format!("write {}", out.display()))?;
    println!("Wrote {} ({} days) to {}", series.title(), series.dates.len(), out.display());
    Ok(())
}

fn score_buckets(config: &Config, range: Option<(NaiveDate, NaiveDate)>) -> Result<DayTable> {
    let paths = &config.paths;
    let lexicon = Lexicon::load(&paths.lexicon)
        .with_context(|| format!("load lexicon {}", paths.lexicon.display()))?;
    let mut days = buckets::load(&paths.day_buckets)
        .with_context(|| format!("load day buckets {}", paths.day_buckets.display()))?;
    if let Some((start, end)) = range {
        days.retain(|b| (start..=end).contains(&b.day));
    }
    let pipeline = EmotionPipeline::new(lexicon, config.scoring.clone())?;
    pipeline
        .score_only(&days)
        .with_context(|| format!("score {}", paths.day_buckets.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodgraph_core::{CsvStore, DayBucket, HistoryStore, PathsConfig};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn config_in(dir: &Path) -> Config {
        Config {
            paths: PathsConfig {
                lexicon: dir.join("lexicon.txt"),
                day_buckets: dir.join("buckets.csv"),
                emotion_history: dir.join("emotions.csv"),
                epidemic_history: dir.join("epidemic.csv"),
            },
            ..Config::default()
        }
    }

    fn write_epidemic(config: &Config, days: &[(NaiveDate, f64)]) {
        let mut epidemic = DayTable::new();
        for (d, cases) in days {
            epidemic
                .insert_column(*d, [("New Cases".to_string(), *cases)].into())
                .unwrap();
        }
        CsvStore::new(&config.paths.epidemic_history, EPIDEMIC_INDEX)
            .write(&epidemic)
            .unwrap();
    }

    #[test]
    fn writes_json_figure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut emotions = DayTable::new();
        emotions.insert_column(day(1), [("fear".to_string(), 4.0)].into()).unwrap();
        CsvStore::new(&config.paths.emotion_history, EMOTION_INDEX).write(&emotions).unwrap();
        write_epidemic(&config, &[(day(1), 12.0)]);

        let out = dir.path().join("fig.json");
        run(&config, EmotionSource::History, "fear", "New Cases", None, &out).unwrap();
        let fig: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(fig["layout"]["title"]["text"], "Fear vs New Cases");
        assert_eq!(fig["data"][0]["y"][0], 12.0);
    }

    #[test]
    fn charts_buckets_without_saving_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.paths.lexicon, "panic\tfear\t1\n").unwrap();
        buckets::save(
            &config.paths.day_buckets,
            &[
                DayBucket::new(day(1), vec!["panic panic"]),
                DayBucket::new(day(2), vec!["panic"]),
                DayBucket::new(day(3), vec!["panic panic panic"]),
            ],
        )
        .unwrap();
        write_epidemic(&config, &[(day(1), 10.0), (day(2), 20.0)]);

        let out = dir.path().join("fig.json");
        run(
            &config,
            EmotionSource::Buckets,
            "fear",
            "New Cases",
            Some((day(1), day(2))),
            &out,
        )
        .unwrap();

        let fig: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(fig["data"][1]["y"], serde_json::json!([2.0, 1.0]));
        assert!(!config.paths.emotion_history.exists());
    }
}
