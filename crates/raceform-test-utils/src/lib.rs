//! raceform-test-utils — Shared fixtures for workspace tests.
//!
//! The demonstration race is a realistic eight-runner handicap with full
//! market, rating, form, badge and connections coverage, so integration
//! tests can exercise every scoring component without network access.

use chrono::NaiveDate;

use raceform_common::{FormLine, RaceData, RaceMeta, Runner};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("fixture date must be valid ISO-8601")
}

/// A minimal runner: name only, everything else absent.
pub fn bare_runner(name: &str) -> Runner {
    Runner {
        runner_name: name.to_string(),
        ..Default::default()
    }
}

/// A form line with just a position and date, the common case in tests.
pub fn form_line(position: Option<u32>, date_str: &str) -> FormLine {
    FormLine {
        position,
        date: Some(date(date_str)),
        ..Default::default()
    }
}

fn full_form_line(
    position: Option<u32>,
    date_str: &str,
    distance: &str,
    going: &str,
    track: &str,
    sp: Option<f64>,
) -> FormLine {
    FormLine {
        position,
        date: Some(date(date_str)),
        distance: Some(distance.to_string()),
        going: Some(going.to_string()),
        race_class: Some("Class 1".to_string()),
        track: Some(track.to_string()),
        sp_decimal: sp,
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_runner(
    name: &str,
    number: u32,
    age: u32,
    weight: &str,
    official_rating: i32,
    rpr: i32,
    jockey: &str,
    trainer: &str,
    trainer_rtf: f64,
    odds: f64,
    recent_form: Vec<FormLine>,
) -> Runner {
    let days_since_last_run = recent_form
        .first()
        .and_then(|line| line.date)
        .map(|d| (date("2026-02-15") - d).num_days() as u32);
    Runner {
        runner_name: name.to_string(),
        number: Some(number),
        age: Some(age),
        weight: Some(weight.to_string()),
        official_rating: Some(official_rating),
        rpr: Some(rpr),
        jockey: Some(jockey.to_string()),
        trainer: Some(trainer.to_string()),
        trainer_rtf: Some(trainer_rtf),
        odds_decimal: Some(odds),
        days_since_last_run,
        recent_form,
        ..Default::default()
    }
}

/// Eight-runner demonstration handicap at Cheltenham, fully populated.
pub fn demo_race() -> RaceData {
    let meta = RaceMeta {
        track: Some("Cheltenham".to_string()),
        date: Some(date("2026-02-15")),
        off_time: Some("14:30".to_string()),
        distance: Some("2m4f".to_string()),
        going: Some("good_to_soft".to_string()),
        race_class: Some("Class 1".to_string()),
        runners_count: 8,
        race_name: Some("Demo Handicap Hurdle".to_string()),
    };

    let mut runners = vec![
        demo_runner(
            "Stormbreaker",
            1,
            6,
            "11-12",
            148,
            155,
            "P. Townend",
            "W. Mullins",
            32.0,
            3.5,
            vec![
                full_form_line(Some(1), "2026-01-20", "2m4f", "good_to_soft", "Leopardstown", Some(2.5)),
                full_form_line(Some(2), "2025-12-26", "2m4f", "soft", "Kempton", Some(3.0)),
                full_form_line(Some(1), "2025-11-15", "2m", "good", "Cheltenham", Some(2.25)),
            ],
        ),
        demo_runner(
            "Midnight Glory",
            2,
            7,
            "11-10",
            145,
            151,
            "R. Blackmore",
            "H. de Bromhead",
            24.0,
            4.0,
            vec![
                full_form_line(Some(1), "2026-01-10", "2m4f", "soft", "Fairyhouse", Some(3.5)),
                full_form_line(Some(3), "2025-12-15", "3m", "heavy", "Cheltenham", Some(4.0)),
                full_form_line(Some(2), "2025-11-01", "2m4f", "good_to_soft", "Down Royal", Some(5.0)),
            ],
        ),
        demo_runner(
            "Golden Arrow",
            3,
            5,
            "11-4",
            140,
            147,
            "J. McGrath",
            "G. Elliott",
            18.0,
            6.0,
            vec![
                full_form_line(Some(2), "2026-01-25", "2m4f", "good", "Naas", Some(4.5)),
                full_form_line(Some(1), "2025-12-28", "2m", "good_to_soft", "Leopardstown", Some(3.0)),
                full_form_line(Some(4), "2025-11-20", "2m4f", "soft", "Punchestown", Some(6.0)),
            ],
        ),
        demo_runner(
            "Silver Blaze",
            4,
            8,
            "11-7",
            143,
            149,
            "D. Russell",
            "J. O'Neill",
            15.0,
            7.0,
            vec![
                full_form_line(Some(3), "2026-01-15", "2m4f", "good_to_soft", "Ascot", Some(5.5)),
                full_form_line(Some(2), "2025-12-20", "2m4f", "good", "Cheltenham", Some(4.0)),
                full_form_line(Some(1), "2025-11-10", "2m4f", "good_to_soft", "Sandown", Some(3.5)),
            ],
        ),
        demo_runner(
            "Thunder Road",
            5,
            6,
            "10-13",
            137,
            144,
            "S. Bowen",
            "N. Henderson",
            21.0,
            10.0,
            vec![
                full_form_line(Some(4), "2026-01-20", "2m", "good_to_soft", "Cheltenham", Some(8.0)),
                full_form_line(Some(1), "2025-12-10", "2m4f", "soft", "Newbury", Some(5.0)),
                full_form_line(Some(2), "2025-11-05", "2m4f", "good_to_soft", "Wetherby", Some(4.5)),
            ],
        ),
        demo_runner(
            "Celtic Fire",
            6,
            7,
            "10-10",
            134,
            140,
            "B. Cooper",
            "P. Nicholls",
            12.0,
            12.0,
            vec![
                full_form_line(Some(5), "2026-01-12", "3m", "heavy", "Cheltenham", Some(10.0)),
                full_form_line(Some(3), "2025-12-05", "2m4f", "good_to_soft", "Exeter", Some(7.0)),
                full_form_line(Some(2), "2025-11-15", "2m4f", "good", "Cheltenham", Some(6.0)),
            ],
        ),
        demo_runner(
            "Wild Rover",
            7,
            9,
            "10-5",
            130,
            135,
            "A. Heskin",
            "E. Lavelle",
            9.0,
            20.0,
            vec![
                full_form_line(Some(6), "2026-01-18", "2m4f", "soft", "Warwick", Some(15.0)),
                full_form_line(Some(4), "2025-12-26", "2m4f", "good_to_soft", "Kempton", Some(12.0)),
                full_form_line(Some(3), "2025-11-08", "2m4f", "good", "Cheltenham", Some(10.0)),
            ],
        ),
        demo_runner(
            "Final Chapter",
            8,
            10,
            "10-0",
            125,
            129,
            "T. O'Brien",
            "D. Pipe",
            7.0,
            33.0,
            vec![
                full_form_line(Some(7), "2026-01-05", "2m4f", "good_to_soft", "Cheltenham", Some(25.0)),
                full_form_line(Some(5), "2025-12-12", "2m4f", "soft", "Ludlow", Some(20.0)),
                full_form_line(None, "2025-11-01", "3m", "good", "Chepstow", Some(16.0)),
            ],
        ),
    ];

    // Badges: the course specialists.
    runners[0].cd_winner = Some(false);
    runners[0].course_winner = Some(true);
    runners[0].distance_winner = Some(true);
    runners[3].cd_winner = Some(true);
    runners[5].course_winner = Some(true);
    runners[5].distance_winner = Some(false);
    runners[6].distance_winner = Some(true);

    RaceData {
        race_id: "cheltenham-2026-02-15-14-30".to_string(),
        meta,
        runners,
    }
}
