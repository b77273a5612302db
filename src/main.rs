//! Walks a change log read from a JSON file and prints every step.
//!
//! Usage: `tablewalk <changes.json> [settings file]`
//!
//! The JSON document is an array of changes:
//! ```json
//! [{"data_name": "actor", "change_type": "Creation",
//!   "row_at_end_point": {"pks": ["id"], "columns": ["id", "name"],
//!                        "values": [{"Number": 1}, {"Text": "Weaver"}]}}]
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use tablewalk::construct::Changes;
use tablewalk::output::ChangesOutput;
use tablewalk::settings::{Settings, init_logging};

fn run(changes_path: PathBuf, settings_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(settings_path.as_deref())?;
    init_logging(&settings);

    let changes: Changes = serde_json::from_str(&fs::read_to_string(&changes_path)?)?;
    info!(path = %changes_path.display(), changes = changes.len(), "change log read");

    let root = ChangesOutput::with_letter_case(changes, settings.letter_case);
    print!("{}", walk(&root)?);
    Ok(())
}

/// Renders the root, then every change with its rows and modified columns.
/// Running out of changes (or columns) ends a walk; any other error aborts it.
fn walk(root: &Arc<ChangesOutput>) -> tablewalk::Result<String> {
    let mut out = root.render();
    loop {
        let change = match root.change() {
            Ok(change) => change,
            Err(e) if e.is_index_out_of_bounds() => break,
            Err(e) => return Err(e),
        };
        out += &change.render();
        out += &change.row_at_start_point()?.render();
        out += &change.row_at_end_point()?.render();
        loop {
            let column = match change.column_among_the_modified_ones() {
                Ok(column) => column,
                Err(e) if e.is_index_out_of_bounds() => break,
                Err(e) => return Err(e),
            };
            out += &column.render();
        }
    }
    Ok(out)
}

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(changes_path) = args.next() else {
        eprintln!("usage: tablewalk <changes.json> [settings file]");
        return ExitCode::from(2);
    };
    match run(changes_path, args.next()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "walk failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_prints_every_modified_column_once() {
        let json = r#"[
            {"data_name": "actor", "change_type": "Modification",
             "row_at_start_point": {"pks": ["id"], "columns": ["id", "name", "birth"],
                                    "values": [{"Number": 2}, {"Text": "Murray"}, {"Text": "1950"}]},
             "row_at_end_point": {"pks": ["id"], "columns": ["id", "name", "birth"],
                                  "values": [{"Number": 2}, {"Text": "Bill"}, {"Text": "1950-09-21"}]}}
        ]"#;
        let changes: Changes = serde_json::from_str(json).expect("valid change log");
        let root = ChangesOutput::new(changes);
        let out = walk(&root).expect("walk ends when the cursors run out");
        assert_eq!(out.matches("[Column ").count(), 2);
        assert!(out.contains("birth: \"1950\" -> \"1950-09-21\""));
        assert!(root.change().err().is_some_and(|e| e.is_index_out_of_bounds()));
    }
}
