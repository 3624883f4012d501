use std::io::{BufRead, Write};

use crate::config::DeckConfig;
use crate::counter::{CalibrationSet, CalibrationStore, Checkpoint};
use crate::error::Result;

const SUGGESTED_CHECKPOINTS: [(f64, &str); 4] = [
    (60.0, "1 minute"),
    (300.0, "5 minutes"),
    (1200.0, "20 minutes"),
    (1800.0, "30 minutes"),
];

/// Walks the user through measuring their deck's counter against a
/// stopwatch and writes the calibration file the manual counter mode reads.
pub fn run(cfg: &DeckConfig) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(&mut stdin.lock(), &mut stdout.lock(), cfg)
}

pub fn run_with(input: &mut impl BufRead, out: &mut impl Write, cfg: &DeckConfig) -> Result<()> {
    let rule = "=".repeat(70);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "    TAPE COUNTER CALIBRATION")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "\nPREPARATION:")?;
    writeln!(out, "  1. Insert a blank cassette and reset the counter to 000")?;
    writeln!(out, "  2. Have a stopwatch ready")?;
    writeln!(out, "  3. Press RECORD on the deck to start the tape")?;
    writeln!(
        out,
        "\nYou will note the counter reading at a few points on the stopwatch."
    )?;
    writeln!(out, "The more checkpoints, the closer the interpolation.")?;

    prompt(input, out, "\nPress Enter when the tape is rolling... ")?;

    writeln!(out, "\nDECK INFORMATION (optional, Enter to skip):")?;
    let tape_type = optional(prompt(input, out, "  Tape type (e.g. C60, C90): ")?);
    let deck_model = optional(prompt(input, out, "  Deck model (e.g. Sony TC-D5M): ")?);

    let mut checkpoints = Vec::new();
    writeln!(out, "\nCHECKPOINTS (Enter without a value skips one):")?;
    for (time_seconds, label) in SUGGESTED_CHECKPOINTS {
        loop {
            let answer = prompt(
                input,
                out,
                &format!("  counter at {label} ({:.0}s): ", time_seconds),
            )?;
            if answer.is_empty() {
                writeln!(out, "    skipped")?;
                break;
            }
            match answer.parse::<f64>() {
                Ok(counter) if counter.is_finite() && counter >= 0.0 => {
                    checkpoints.push(Checkpoint {
                        time_seconds,
                        counter,
                        note: Some(label.to_string()),
                    });
                    writeln!(out, "    recorded {counter} at {label}")?;
                    break;
                }
                _ => writeln!(out, "    not a counter value, try again or press Enter")?,
            }
        }
    }

    let measure_end = prompt(input, out, "\nMeasure the end of the tape too? (y/n): ")?;
    if measure_end.eq_ignore_ascii_case("y") {
        writeln!(out, "Let the tape run until it stops at the end of the side.")?;
        loop {
            let answer = prompt(input, out, "  total time (seconds or MM:SS): ")?;
            if answer.is_empty() {
                writeln!(out, "    skipped")?;
                break;
            }
            let Some(time_seconds) = parse_time(&answer) else {
                writeln!(out, "    use seconds (1800) or MM:SS (30:00)")?;
                continue;
            };
            let counter_answer = prompt(input, out, "  final counter value: ")?;
            if let Ok(counter) = counter_answer.parse::<f64>() {
                checkpoints.push(Checkpoint {
                    time_seconds,
                    counter,
                    note: Some("End of tape".to_string()),
                });
                writeln!(out, "    recorded end: {counter} at {time_seconds}s")?;
            }
            break;
        }
    }

    if checkpoints.is_empty() {
        writeln!(out, "\nNo checkpoints recorded. Calibration cancelled.")?;
        return Ok(());
    }

    let mut set = CalibrationSet {
        deck_model,
        tape_type,
        calibration_date: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        checkpoints,
    };
    set.sort();

    writeln!(out, "\n{rule}")?;
    writeln!(out, "CALIBRATION SUMMARY:")?;
    writeln!(
        out,
        "  Deck: {}   Tape: {}",
        set.deck_model.as_deref().unwrap_or("Unknown"),
        set.tape_type.as_deref().unwrap_or("Unknown")
    )?;
    let mut prev = (0.0, 0.0);
    for cp in &set.checkpoints {
        let note = cp.note.as_deref().unwrap_or("");
        // Rate over the segment since the previous mark (counter reads
        // zero at the start of the tape).
        let rate = (cp.counter - prev.1) / (cp.time_seconds - prev.0);
        writeln!(
            out,
            "    {:<12} {:>5}  (rate {:.3} counts/sec)",
            note, cp.counter, rate
        )?;
        prev = (cp.time_seconds, cp.counter);
    }
    if let Some(rate) = average_rate(&set) {
        writeln!(out, "\n  Average rate: {rate:.3} counts/second")?;
    }

    let store = CalibrationStore::new(cfg.calibration_path());
    if let Some(dir) = store.path().parent() {
        std::fs::create_dir_all(dir)?;
    }
    store.save(&set)?;

    writeln!(out, "\nCalibration saved to {}", store.path().display())?;
    writeln!(
        out,
        "Use it with: deckrec --counter-mode manual --folder {}",
        cfg.folder.display()
    )?;
    writeln!(out, "{rule}")?;
    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, text: &str) -> Result<String> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn optional(answer: String) -> Option<String> {
    if answer.is_empty() {
        None
    } else {
        Some(answer)
    }
}

/// Accepts plain seconds ("1800") or MM:SS ("30:00").
pub fn parse_time(input: &str) -> Option<f64> {
    let input = input.trim();
    if let Some((m, s)) = input.split_once(':') {
        let minutes: u32 = m.parse().ok()?;
        let seconds: u32 = s.parse().ok()?;
        return Some(minutes as f64 * 60.0 + seconds as f64);
    }
    input.parse::<f64>().ok().filter(|t| t.is_finite() && *t > 0.0)
}

/// Overall pace between the first and last checkpoint.
pub fn average_rate(set: &CalibrationSet) -> Option<f64> {
    let first = set.checkpoints.first()?;
    let last = set.checkpoints.last()?;
    let span = last.time_seconds - first.time_seconds;
    if span > 0.0 {
        Some((last.counter - first.counter) / span)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;

    fn config_in(dir: &tempfile::TempDir) -> DeckConfig {
        let args = crate::config::CliArgs::try_parse_from([
            "deckrec",
            "--folder",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        DeckConfig::from_args(&args).unwrap()
    }

    #[test]
    fn time_parses_both_forms() {
        assert_eq!(parse_time("1800"), Some(1800.0));
        assert_eq!(parse_time("30:00"), Some(1800.0));
        assert_eq!(parse_time("2:45"), Some(165.0));
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time("1:2:3"), None);
        assert_eq!(parse_time("-30"), None);
    }

    #[test]
    fn average_rate_spans_first_to_last() {
        let set = CalibrationSet::from_points(&[(60.0, 85.0), (1800.0, 2534.0)]);
        let rate = average_rate(&set).unwrap();
        assert!((rate - (2534.0 - 85.0) / 1740.0).abs() < 1e-9);
        assert!(average_rate(&CalibrationSet::from_points(&[(60.0, 85.0)])).is_none());
    }

    #[test]
    fn full_session_writes_a_loadable_calibration() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        // Enter, tape type, deck model, four checkpoints, end-of-tape.
        let script = "\nC90\nAIWA AD-F780\n85\n422\n1690\n2534\ny\n45:00\n3600\n";
        let mut out = Vec::new();
        run_with(&mut Cursor::new(script), &mut out, &cfg).unwrap();

        let stored = CalibrationStore::new(cfg.calibration_path()).load().unwrap();
        assert_eq!(stored.checkpoints.len(), 5);
        assert_eq!(stored.deck_model.as_deref(), Some("AIWA AD-F780"));
        assert_eq!(stored.tape_type.as_deref(), Some("C90"));
        assert!(stored.calibration_date.is_some());
        assert_eq!(stored.checkpoints[4].time_seconds, 2700.0);
        assert_eq!(stored.checkpoints[4].counter, 3600.0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("CALIBRATION SUMMARY"));
        assert!(text.contains("Average rate"));
    }

    #[test]
    fn skipping_everything_cancels_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let script = "\n\n\n\n\n\n\nn\n";
        let mut out = Vec::new();
        run_with(&mut Cursor::new(script), &mut out, &cfg).unwrap();

        assert!(!cfg.calibration_path().exists());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Calibration cancelled"));
    }

    #[test]
    fn bad_counter_values_reprompt_instead_of_crashing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        // First checkpoint gets garbage then a real value; the rest skip.
        let script = "\n\n\nnot-a-number\n85\n\n\n\nn\n";
        let mut out = Vec::new();
        run_with(&mut Cursor::new(script), &mut out, &cfg).unwrap();

        let stored = CalibrationStore::new(cfg.calibration_path()).load().unwrap();
        assert_eq!(stored.checkpoints.len(), 1);
        assert_eq!(stored.checkpoints[0].counter, 85.0);
    }
}
