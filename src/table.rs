//! Tab-separated per-event selection tables and the cutflow built from them.

use std::path::Path;

use polars::prelude::*;

use crate::error::AnalysisResult;
use crate::selection::{EventSelection, Verdict};

const PASSED: &str = "passed";

fn level_columns(prefix: &str, verdicts: &[&Verdict]) -> Vec<Series> {
    let name = |column: &str| format!("{prefix}_{column}");
    vec![
        Series::new(
            &name("pass"),
            verdicts.iter().map(|v| v.passed()).collect::<Vec<bool>>(),
        ),
        Series::new(
            &name("jets"),
            verdicts.iter().map(|v| v.jets.jets as u32).collect::<Vec<u32>>(),
        ),
        Series::new(
            &name("btags"),
            verdicts.iter().map(|v| v.jets.b_tagged as u32).collect::<Vec<u32>>(),
        ),
        Series::new(
            &name("leptons"),
            verdicts.iter().map(|v| v.n_leptons as u32).collect::<Vec<u32>>(),
        ),
        Series::new(
            &name("isolated"),
            verdicts
                .iter()
                .map(|v| v.isolation.map(|iso| iso.isolated))
                .collect::<Vec<Option<bool>>>(),
        ),
        Series::new(
            &name("met"),
            verdicts.iter().map(|v| v.met).collect::<Vec<f64>>(),
        ),
        Series::new(
            &name("mtw"),
            verdicts.iter().map(|v| v.mtw).collect::<Vec<Option<f64>>>(),
        ),
        Series::new(
            &name("reason"),
            verdicts
                .iter()
                .map(|v| v.first_rejection().map_or(PASSED, |r| r.code()))
                .collect::<Vec<&str>>(),
        ),
    ]
}

/// One row per event with both verdicts and the quantities behind them.
pub fn selection_frame(selections: &[EventSelection]) -> AnalysisResult<DataFrame> {
    let mut columns = vec![
        Series::new("event", (0..selections.len() as u64).collect::<Vec<u64>>()),
        Series::new(
            "weight",
            selections.iter().map(|s| s.weight).collect::<Vec<f64>>(),
        ),
    ];
    let detector: Vec<&Verdict> = selections.iter().map(|s| &s.detector).collect();
    let particle: Vec<&Verdict> = selections.iter().map(|s| &s.particle).collect();
    columns.extend(level_columns("detector", &detector));
    columns.extend(level_columns("particle", &particle));
    columns.push(Series::new(
        "leptons_agree",
        selections
            .iter()
            .map(|s| s.lepton_counts_agree)
            .collect::<Vec<bool>>(),
    ));
    Ok(DataFrame::new(columns)?)
}

pub fn write_table<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> AnalysisResult<()> {
    let file = std::fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)?;
    let mut writer = CsvWriter::new(file);
    writer = writer.with_separator(b'\t');
    writer.finish(df)?;
    Ok(())
}

pub fn read_table<P: AsRef<Path>>(path: P) -> AnalysisResult<DataFrame> {
    let df = CsvReadOptions::default()
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn level_cutflow(df: &DataFrame, level: &str) -> AnalysisResult<DataFrame> {
    let reason = format!("{level}_reason");
    let cutflow = df
        .clone()
        .lazy()
        .group_by_stable([col(&reason).alias("reason")])
        .agg([
            col("event").count().alias("events"),
            col("weight").sum().alias("weight"),
        ])
        .with_columns([
            lit(level).alias("level"),
            (col("weight") / col("weight").sum()).alias("fraction"),
        ])
        .select([
            col("level"),
            col("reason"),
            col("events"),
            col("weight"),
            col("fraction"),
        ])
        .collect()?;
    Ok(cutflow)
}

/// Weighted event counts per level, grouped by the first requirement each event failed
/// (`passed` for selected events).
pub fn cutflow(df: &DataFrame) -> AnalysisResult<DataFrame> {
    let detector = level_cutflow(df, "detector")?;
    let particle = level_cutflow(df, "particle")?;
    Ok(detector.vstack(&particle)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::config::AnalysisConfig;
    use crate::generate::Sample;
    use approx::assert_relative_eq;

    fn selections() -> Vec<EventSelection> {
        let sample = Sample::generate(100, 100, 21);
        let (_, selections) = Analysis::new(AnalysisConfig::default())
            .unwrap()
            .run(&sample.events, 1.0)
            .unwrap();
        selections
    }

    #[test]
    fn test_selection_frame_shape() {
        let selections = selections();
        let df = selection_frame(&selections).unwrap();
        assert_eq!(df.height(), 200);
        assert_eq!(df.width(), 2 + 2 * 8 + 1);
        let passed = df
            .column("particle_pass")
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .filter(|pass| *pass == Some(true))
            .count();
        let expected = selections.iter().filter(|s| s.particle.passed()).count();
        assert_eq!(passed, expected);
    }

    #[test]
    fn test_cutflow_covers_every_event() {
        let df = selection_frame(&selections()).unwrap();
        let cutflow = cutflow(&df).unwrap();
        let levels = cutflow.column("level").unwrap().str().unwrap();
        let events = cutflow.column("events").unwrap().cast(&DataType::UInt64).unwrap();
        let events = events.u64().unwrap();
        let fractions = cutflow.column("fraction").unwrap().f64().unwrap();
        for level in ["detector", "particle"] {
            let mut total = 0;
            let mut fraction = 0.0;
            for i in 0..cutflow.height() {
                if levels.get(i) == Some(level) {
                    total += events.get(i).unwrap_or(0);
                    fraction += fractions.get(i).unwrap_or(0.0);
                }
            }
            assert_eq!(total, 200);
            assert_relative_eq!(fraction, 1.0, epsilon = 1e-9);
        }
    }
}
