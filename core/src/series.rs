//! Aligned emotion / metric series and their plot rendering.
//!
//! The chart puts one epidemic metric (bars, left axis) next to one emotion
//! (line, right axis) over a daily date range. Output is a plotly figure, either
//! as JSON or as a standalone HTML page.

use crate::error::{MoodError, Result};
use crate::history::DayTable;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

const EMOTION_COLOR: &str = "#1A70C7";
const METRIC_COLOR: &str = "#342e37";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Every day from `start` to `end`, both included. Empty if `end < start`.
pub fn desired_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let span = (end - start).num_days();
    (0..=span).map(|n| start + Duration::days(n)).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub emotion: String,
    pub metric: String,
    pub dates: Vec<NaiveDate>,
    pub emotion_values: Vec<f64>,
    pub metric_values: Vec<f64>,
}

impl ChartSeries {
    /// Align `emotion` from the emotion table with `metric` from the epidemic
    /// table over `start..=end`. Every day must be present in both.
    pub fn build(
        emotions: &DayTable,
        epidemic: &DayTable,
        emotion: &str,
        metric: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        let dates = desired_dates(start, end);
        let mut emotion_values = Vec::with_capacity(dates.len());
        let mut metric_values = Vec::with_capacity(dates.len());
        for &day in &dates {
            emotion_values.push(
                emotions
                    .value(day, emotion)
                    .ok_or(MoodError::MissingDay { table: "emotion", day })?,
            );
            metric_values.push(
                epidemic
                    .value(day, metric)
                    .ok_or(MoodError::MissingDay { table: "epidemic", day })?,
            );
        }
        Ok(Self {
            emotion: emotion.to_string(),
            metric: metric.to_string(),
            dates,
            emotion_values,
            metric_values,
        })
    }

    /// Like [`ChartSeries::build`], over the emotion table's full day range.
    pub fn from_saved(emotions: &DayTable, epidemic: &DayTable, emotion: &str, metric: &str) -> Result<Self> {
        let (Some(start), Some(end)) = (emotions.first_day(), emotions.last_day()) else {
            return Err(MoodError::EmptyInput);
        };
        Self::build(emotions, epidemic, emotion, metric, start, end)
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", capitalize(&self.emotion), self.metric)
    }

    /// Plotly figure: metric bars on the primary y axis, emotion line on the secondary.
    pub fn to_figure_json(&self) -> Value {
        let dates: Vec<String> = self.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        let emotion_label = capitalize(&self.emotion);
        json!({
            "data": [
                {
                    "type": "bar",
                    "x": dates,
                    "y": self.metric_values,
                    "name": self.metric,
                    "marker": { "color": METRIC_COLOR },
                    "yaxis": "y"
                },
                {
                    "type": "scatter",
                    "mode": "lines",
                    "x": dates,
                    "y": self.emotion_values,
                    "name": emotion_label,
                    "marker": { "color": EMOTION_COLOR },
                    "line": { "width": 6 },
                    "yaxis": "y2"
                }
            ],
            "layout": {
                "title": { "text": self.title() },
                "xaxis": { "title": { "text": "Dates" } },
                "yaxis": { "title": { "text": format!("<b>{}</b>", self.metric) } },
                "yaxis2": {
                    "title": { "text": format!("<b>{emotion_label}</b>") },
                    "overlaying": "y",
                    "side": "right"
                }
            }
        })
    }

    /// Self-contained HTML page rendering the figure with plotly.js.
    pub fn to_html(&self) -> String {
        let figure = self.to_figure_json();
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n\
             <div id=\"chart\" style=\"width:100%;height:90vh;\"></div>\n<script>\n\
             const fig = {figure};\nPlotly.newPlot(\"chart\", fig.data, fig.layout);\n\
             </script>\n</body>\n</html>\n",
            title = self.title(),
        )
    }
}
