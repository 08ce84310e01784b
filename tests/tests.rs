//! Integration tests for `sentiment_dashboard`.
//
// This suite verifies:
// - Library behavior (load, filter, aggregates, page dispatch)
// - The worked scenarios for filtering and empty results
// - CLI behavior including export formats, filters, and failure modes
//
// Notes:
// - CLI tests run the binary with a per-process working directory (no global CWD change).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use serde_json::Value as Json;

use sentiment_dashboard::{
    ColumnAvailability, Dataset, Dimension, FilterValue, KeywordOptions, MONTHS, Page,
    PageOptions, Record, RecordStore, Selection, apply, build_page, cross_tab, dashboard_page,
    geo_cross_tab, sentiment_counts, top_keywords, FilterDomain,
};

// --------------------- helpers ---------------------

/// Create a file with content in a temp dir.
fn write_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let f = dir.child(name);
    f.write_str(content).unwrap();
    f.path().to_path_buf()
}

fn record(sentiment: &str, year: &str, month: &str, day: &str, text: &str) -> Record {
    Record {
        sentiment: sentiment.into(),
        text: text.into(),
        year: year.into(),
        month: month.into(),
        day_of_week: day.into(),
        platform: None,
        country: None,
    }
}

/// The two-row dataset used by the worked scenarios.
fn scenario_dataset() -> Dataset {
    Dataset::from_records(
        vec![
            record("positive", "2021", "January", "Monday", "great service"),
            record("negative", "2021", "January", "Monday", "bad support"),
        ],
        ColumnAvailability::default(),
    )
}

const SAMPLE_CSV: &str = "\
Text,Sentiment,Timestamp,User,Platform,Hashtags,Retweets,Likes,Country,Year,Month,Day,Hour,Day_of_Week
Enjoying a beautiful day at the park!,positive,2023-01-15 12:30:00,User123,Twitter,#Nature,15,30,USA,2023,January,15,12,Sunday
Traffic was terrible this morning.,negative,2023-01-15 08:45:00,CommuterX,Twitter,#Traffic,5,10,Canada,2023,January,15,8,Sunday
Just finished an amazing workout!,positive,2023-01-15 15:45:00,FitnessFan,Instagram,#Fitness,20,40,USA,2023,January,15,15,Sunday
Excited about the upcoming weekend getaway!,positive,2023-01-16 19:20:00,AdventureX,Facebook,#Travel,8,15,UK,2023,January,16,19,Monday
Trying out a new recipe for dinner tonight.,neutral,2023-01-16 14:10:00,ChefCook,Instagram,#Food,12,25,Australia,2023,January,16,14,Monday
Feeling grateful for the little things.,positive,2022-02-17 09:30:00,GratitudeNow,Twitter,#Gratitude,25,50,,2022,February,17,9,Thursday
Rainy days call for cozy blankets and hot cocoa.,neutral,2022-03-18 20:05:00,RainyDays,Facebook,#Weather,10,20,USA,2022,March,18,20,Friday
The new movie release is a must-watch!,positive,2022-03-19 17:25:00,MovieBuff,Instagram,#Movies,15,30,Canada,2022,March,19,17,Saturday
Political discussions heating up on the timeline.,negative,2021-07-20 13:40:00,PoliticalPundit,Twitter,#Politics,30,60,UK,2021,July,20,13,Wednesday
Missing summer vibes and beach days.,negative,2021-07-21 11:15:00,BeachLover,Facebook,#Summer,18,35,,2021.0,July,21,11,Thursday
";

// --------------------- library tests ---------------------

#[test]
fn scenario_year_filter_counts_both_rows() {
    let ds = scenario_dataset();
    let sel = Selection {
        year: FilterValue::exact("2021"),
        ..Selection::all()
    };
    let view = apply(&ds, &sel);
    assert_eq!(view.len(), 2);

    let c = sentiment_counts(&view);
    assert_eq!(c.entries(), [("positive", 1), ("neutral", 0), ("negative", 1)]);
}

#[test]
fn scenario_neutral_filter_is_empty_everywhere() {
    let ds = scenario_dataset();
    let sel = Selection {
        sentiment: FilterValue::exact("neutral"),
        ..Selection::all()
    };
    let view = apply(&ds, &sel);
    assert!(view.is_empty());

    let c = sentiment_counts(&view);
    assert_eq!(c.entries(), [("positive", 0), ("neutral", 0), ("negative", 0)]);
    assert!(top_keywords(&view, "neutral", &KeywordOptions::default()).is_empty());
}

#[test]
fn scenario_blank_country_excluded_from_geo_only() {
    let mut r = record("positive", "2021", "May", "Friday", "ok");
    r.country = Some(String::new());
    let ds = Dataset::from_records(vec![r], ColumnAvailability::all());
    let view = apply(&ds, &Selection::all());

    let geo = geo_cross_tab(&view);
    assert!(geo.entries.is_empty());
    assert_eq!(geo.excluded, 1);
    assert_eq!(sentiment_counts(&view).positive, 1);
}

#[test]
fn filtered_view_is_subset_and_deterministic() {
    let ds = Dataset::from_reader(SAMPLE_CSV.as_bytes(), b',', Path::new("sample.csv")).unwrap();
    let domain = FilterDomain::from_dataset(&ds);
    let all: HashSet<*const Record> = ds.records().iter().map(|r| r as *const Record).collect();

    let mut selections = vec![Selection::all()];
    for s in &domain.sentiments {
        for y in &domain.years {
            selections.push(Selection {
                sentiment: FilterValue::exact(s.clone()),
                year: FilterValue::exact(y.clone()),
                ..Selection::all()
            });
        }
    }
    for m in MONTHS {
        selections.push(Selection {
            month: FilterValue::exact(m),
            day_of_week: FilterValue::exact("Sunday"),
            ..Selection::all()
        });
    }

    for sel in &selections {
        let a: Vec<*const Record> = apply(&ds, sel).iter().map(|r| r as *const Record).collect();
        let b: Vec<*const Record> = apply(&ds, sel).iter().map(|r| r as *const Record).collect();
        assert_eq!(a, b, "apply is not deterministic for {sel}");
        assert!(a.iter().all(|p| all.contains(p)), "view escapes dataset for {sel}");

        let view = apply(&ds, sel);
        let c = sentiment_counts(&view);
        assert_eq!(c.positive + c.neutral + c.negative, view.len());

        let geo = geo_cross_tab(&view);
        assert!(geo.total() <= view.len());

        let months = cross_tab(&view, Dimension::Month, &domain);
        assert_eq!(months.categories, MONTHS.to_vec());
    }

    // all-wildcard returns the whole dataset
    let full: HashSet<*const Record> = apply(&ds, &Selection::all())
        .iter()
        .map(|r| r as *const Record)
        .collect();
    assert_eq!(full, all);
}

#[test]
fn sample_dataset_loads_and_normalizes() {
    let td = assert_fs::TempDir::new().unwrap();
    let path = write_file(&td, "data.csv", SAMPLE_CSV);
    let store = RecordStore::new(&path);
    let ds = store.load().unwrap();
    assert_eq!(ds.len(), 10);
    assert_eq!(ds.columns(), ColumnAvailability::all());

    let domain = FilterDomain::from_dataset(ds);
    assert_eq!(domain.years, vec!["2021", "2022", "2023"]);
    assert_eq!(domain.sentiments, vec!["negative", "neutral", "positive"]);

    let view = apply(ds, &Selection::all());
    let geo = geo_cross_tab(&view);
    assert_eq!(geo.excluded, 2);
    assert_eq!(geo.total(), 8);
}

#[test]
fn dashboard_page_rejects_unknown_filter_value() {
    let td = assert_fs::TempDir::new().unwrap();
    let path = write_file(&td, "data.csv", SAMPLE_CSV);
    let store = RecordStore::new(&path);
    let sel = Selection {
        year: FilterValue::exact("1999"),
        ..Selection::all()
    };
    let err = dashboard_page(&store, Page::Dashboard, &sel, &PageOptions::default()).unwrap_err();
    assert!(err.to_string().contains("unknown year '1999'"), "{err}");
}

#[test]
fn every_page_builds_on_empty_view() {
    let ds = Dataset::from_reader(SAMPLE_CSV.as_bytes(), b',', Path::new("sample.csv")).unwrap();
    let sel = Selection {
        month: FilterValue::exact("December"),
        ..Selection::all()
    };
    let view = apply(&ds, &sel);
    assert!(view.is_empty());
    for page in Page::ALL {
        let report = build_page(page, &ds, &view, &sel, &PageOptions::default())
            .unwrap_or_else(|e| panic!("{page:?} failed on empty view: {e}"));
        assert_eq!(report.rows, 0);
        assert!(!report.sections.is_empty());
    }
}

// --------------------- CLI tests ---------------------

/// Run CLI successfully with a specific working directory.
fn run_cli_ok_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("sentiment_dashboard").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().success()
}

/// Run CLI expecting failure with a specific working directory.
fn run_cli_fail_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("sentiment_dashboard").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().failure()
}

fn files_with_ext(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|x| x == ext).unwrap_or(false))
        .collect();
    out.sort();
    out
}

#[test]
fn cli_missing_dataset_fails() {
    let td = tempfile::tempdir().unwrap();
    let out = run_cli_fail_in(td.path(), &["--data", "does_not_exist.csv"])
        .stderr(predicate::str::contains("is unavailable"));
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert_eq!(stderr.matches("is unavailable").count(), 1, "{stderr}");
}

#[test]
fn cli_missing_required_column_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "bad.csv", "Sentiment,Text,Year\npositive,x,2021\n");
    run_cli_fail_in(td.path(), &["--data", "bad.csv"])
        .stderr(predicate::str::contains("Month"));
}

#[test]
fn cli_default_html_dashboard() {
    let td = assert_fs::TempDir::new().unwrap();
    // default dataset name in the working directory
    let _f = write_file(&td, "clean_sentimentdataset.csv", SAMPLE_CSV);

    run_cli_ok_in(td.path(), &[])
        .stdout(predicate::str::contains("Sentiment Analysis Dashboard"))
        .stdout(predicate::str::contains("Records: 10"));

    let re = Regex::new(r"^dashboard_\d{8}_\d{6}\.html$").unwrap();
    let html = files_with_ext(td.path(), "html");
    assert_eq!(html.len(), 1);
    let name = html[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(re.is_match(&name), "unexpected file name {name}");

    let content = fs::read_to_string(&html[0]).unwrap();
    assert!(content.contains("<svg"));
    assert!(content.contains("Total Records"));
    assert!(content.contains("Top Platforms by Total Reviews"));
}

#[test]
fn cli_filters_and_json_export() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "data.csv", SAMPLE_CSV);

    run_cli_ok_in(
        td.path(),
        &[
            "--data",
            "data.csv",
            "--year",
            "2023",
            "--sentiment",
            "positive",
            "--export-format",
            "json",
        ],
    );

    let json = files_with_ext(td.path(), "json");
    assert_eq!(json.len(), 1);
    let v: Json = serde_json::from_str(&fs::read_to_string(&json[0]).unwrap()).unwrap();
    assert_eq!(v["page"], "dashboard");
    assert_eq!(v["rows"], 3);
    assert_eq!(v["selection"]["year"], "2023");
    assert_eq!(v["selection"]["month"], "All");
    assert_eq!(v["data"]["sentiment_counts"]["positive"], 3);
    assert_eq!(v["data"]["sentiment_counts"]["negative"], 0);
    // svg bodies are not part of the json export
    assert!(v.get("sections").is_none());
}

#[test]
fn cli_keywords_csv_export() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "data.csv", SAMPLE_CSV);

    run_cli_ok_in(
        td.path(),
        &[
            "--data",
            "data.csv",
            "--page",
            "keywords",
            "--export-format",
            "csv",
            "--top-n",
            "3",
        ],
    )
    .stdout(predicate::str::contains("Top keywords - Neutral:"));

    let csvs = files_with_ext(td.path(), "csv");
    let keywords = csvs
        .iter()
        .find(|p| p.to_string_lossy().ends_with("_keywords.csv"))
        .expect("keywords table");
    let content = fs::read_to_string(keywords).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("sentiment,rank,term,count"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.iter().filter(|r| r.starts_with("positive,")).count(), 3);
    assert!(csvs.iter().any(|p| p.to_string_lossy().ends_with("_wordcloud.csv")));
}

#[test]
fn cli_geo_map_without_country_column_warns() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(
        &td,
        "nocountry.csv",
        "Sentiment,Text,Year,Month,Day_of_Week\npositive,fine day,2021,May,Friday\n",
    );
    run_cli_ok_in(
        td.path(),
        &["--data", "nocountry.csv", "--page", "geo-map", "--export-format", "txt"],
    )
    .stdout(predicate::str::contains(
        "Notice: No 'Country' column available for map visualization.",
    ));
    assert_eq!(files_with_ext(td.path(), "txt").len(), 1);
}

#[test]
fn cli_unknown_filter_value_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "data.csv", SAMPLE_CSV);
    run_cli_fail_in(td.path(), &["--data", "data.csv", "--month", "Smarch"])
        .stderr(predicate::str::contains("unknown month 'Smarch'"));
}

#[test]
fn cli_all_pages_and_out_dir() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "data.csv", SAMPLE_CSV);
    run_cli_ok_in(
        td.path(),
        &["--data", "data.csv", "--all-pages", "--out-dir", "reports", "-q"],
    )
    .stdout(predicate::str::is_empty());

    let html = files_with_ext(&td.path().join("reports"), "html");
    assert_eq!(html.len(), 4);
}

#[test]
fn cli_config_file_and_list_filters() {
    let td = assert_fs::TempDir::new().unwrap();
    let _f = write_file(&td, "reviews.csv", SAMPLE_CSV);
    let _c = write_file(&td, "sentiment_dashboard.toml", "data = \"reviews.csv\"\n");

    run_cli_ok_in(td.path(), &["--list-filters"])
        .stdout(predicate::str::contains("Year: All, 2021, 2022, 2023"))
        .stdout(predicate::str::contains("Day of Week: All, Monday, Tuesday"));
}
