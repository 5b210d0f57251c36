use std::io::{self, Write};

use tracing_subscriber::EnvFilter;
use workout_tracker::{
    AppConfig, BodyPartFilter, CatalogConfig, DateKey, Exercise, ExerciseCatalog, KeyValueStore,
    Planner, ReqwestCatalogClient, Workout, catalog::DEFAULT_LIMIT, filter_by_body_part,
    load_snapshot_from_json, save_schedule_to_csv, save_snapshot_to_json,
};

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_workouts(workouts: &[Workout]) -> String {
    let rows: Vec<Vec<String>> = workouts
        .iter()
        .enumerate()
        .map(|(idx, w)| {
            vec![
                (idx + 1).to_string(),
                w.name.clone(),
                w.exercises.len().to_string(),
                w.id.clone(),
            ]
        })
        .collect();
    render_text_table(&["#", "name", "exercises", "id"], &rows)
}

fn render_day(date: DateKey, workouts: &[Workout]) -> String {
    if workouts.is_empty() {
        return format!("{date}: no workouts\n");
    }
    let mut out = format!("{date}:\n");
    for (idx, w) in workouts.iter().enumerate() {
        out.push_str(&format!("  {}. {} ({} exercises)\n", idx + 1, w.name, w.exercises.len()));
    }
    out
}

const HELP: &str = "Commands:
  help                               Show this help
  workouts                           List saved workouts
  catalog [body-part]                Fetch the exercise catalog (optionally filtered)
  pick <exercise-id>                 Add a catalog exercise to the new workout
  picked                             Show exercises picked so far
  create <name...>                   Save a workout from the picked exercises
  delete <n>                         Delete workout #n (and its schedule entries)
  assign <YYYY-MM-DD> <n>            Assign workout #n to a date
  unassign <YYYY-MM-DD> <i>          Remove entry #i from a date
  day <YYYY-MM-DD>                   Show workouts on a date
  week [YYYY-MM-DD]                  Show the week around a date (default today)
  schedule                           Show every scheduled date
  export csv <path>                  Write the schedule as CSV
  save json <path>                   Write a full JSON backup
  load json <path>                   Restore a JSON backup
  quit|exit                          Exit";

fn print_help() {
    println!("{HELP}");
}

fn parse_position(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
}

fn parse_date(raw: Option<&str>) -> Option<DateKey> {
    raw.and_then(|s| s.parse::<DateKey>().ok())
}

fn fetch_catalog() -> anyhow::Result<Vec<Exercise>> {
    let config = CatalogConfig::from_env()?;
    let client = ReqwestCatalogClient::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(client.fetch_exercises(DEFAULT_LIMIT, 0))?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let store = config.open_store()?;
    let mut planner: Planner<dyn KeyValueStore> = Planner::open(store);
    for notice in planner.take_notices() {
        println!("Warning: {notice}");
    }

    let mut catalog: Vec<Exercise> = Vec::new();
    let mut picked: Vec<Exercise> = Vec::new();

    println!("Workout Tracker (CLI) - type 'help' for commands\n");
    println!("{}", render_workouts(planner.workouts()));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "workouts" => println!("{}", render_workouts(planner.workouts())),
            "catalog" => {
                let filter = BodyPartFilter::parse(&parts.collect::<Vec<_>>().join(" "));
                if !filter.is_known() {
                    println!("Unknown body part.");
                    continue;
                }
                if catalog.is_empty() {
                    match fetch_catalog() {
                        Ok(exercises) => catalog = exercises,
                        Err(e) => {
                            println!("Catalog error: {e}");
                            continue;
                        }
                    }
                }
                let rows: Vec<Vec<String>> = filter_by_body_part(&catalog, &filter)
                    .into_iter()
                    .map(|e| {
                        vec![
                            e.id.clone(),
                            e.name.clone(),
                            e.body_part.clone(),
                            e.target.clone(),
                        ]
                    })
                    .collect();
                println!("{}", render_text_table(&["id", "name", "body part", "target"], &rows));
            }
            "pick" => {
                let Some(id) = parts.next() else {
                    println!("Usage: pick <exercise-id>");
                    continue;
                };
                if picked.iter().any(|e| e.id == id) {
                    println!("Exercise {id} already picked.");
                    continue;
                }
                match catalog.iter().find(|e| e.id == id) {
                    Some(exercise) => {
                        picked.push(exercise.clone());
                        println!("Picked {} ({} total).", exercise.name, picked.len());
                    }
                    None => println!("Exercise {id} is not in the fetched catalog."),
                }
            }
            "picked" => {
                if picked.is_empty() {
                    println!("No exercises picked.");
                }
                for (idx, e) in picked.iter().enumerate() {
                    println!("  {}. {}", idx + 1, e.name);
                }
            }
            "create" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                match planner.create_workout(&name, picked.clone()) {
                    Ok(workout) => {
                        picked.clear();
                        println!("Created workout '{}'.", workout.name);
                        println!("{}", render_workouts(planner.workouts()));
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete" => {
                let Some(index) = parse_position(parts.next()) else {
                    println!("Usage: delete <n>");
                    continue;
                };
                match planner.delete_workout_at(index) {
                    Ok(workout) => println!("Deleted workout '{}'.", workout.name),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "assign" => {
                let date = parse_date(parts.next());
                let index = parse_position(parts.next());
                let (Some(date), Some(index)) = (date, index) else {
                    println!("Usage: assign <YYYY-MM-DD> <n>");
                    continue;
                };
                let result = planner
                    .workout_at(index)
                    .and_then(|workout| planner.assign(date, &workout.id));
                match result {
                    Ok(workout) => println!("Assigned '{}' to {date}.", workout.name),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "unassign" => {
                let date = parse_date(parts.next());
                let index = parse_position(parts.next());
                let (Some(date), Some(index)) = (date, index) else {
                    println!("Usage: unassign <YYYY-MM-DD> <i>");
                    continue;
                };
                match planner.unassign(date, index) {
                    Ok(workout) => println!("Removed '{}' from {date}.", workout.name),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "day" => match parse_date(parts.next()) {
                Some(date) => print!("{}", render_day(date, planner.workouts_for(date))),
                None => println!("Usage: day <YYYY-MM-DD>"),
            },
            "week" => {
                let date = match parts.next() {
                    Some(raw) => match raw.parse::<DateKey>() {
                        Ok(date) => date,
                        Err(e) => {
                            println!("Error: {e}");
                            continue;
                        }
                    },
                    None => DateKey::today(),
                };
                for (day, workouts) in planner.week(date) {
                    print!("{}", render_day(day, workouts));
                }
            }
            "schedule" => {
                if planner.schedule().is_empty() {
                    println!("Nothing scheduled.");
                }
                for (date, workouts) in planner.schedule() {
                    print!("{}", render_day(*date, workouts));
                }
            }
            "export" | "save" | "load" => {
                let kind = parts.next();
                let Some(path) = parts.next() else {
                    println!("Usage: {cmd} <format> <path>");
                    continue;
                };
                match (cmd, kind) {
                    ("export", Some("csv")) => {
                        match save_schedule_to_csv(planner.schedule(), path) {
                            Ok(()) => println!("Schedule exported to {path}."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    ("save", Some("json")) => {
                        let snapshot = planner.snapshot();
                        match save_snapshot_to_json(&snapshot, path) {
                            Ok(()) => println!("Backup saved to {path}."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    ("load", Some("json")) => {
                        let restored = load_snapshot_from_json(path)
                            .map_err(workout_tracker::PlannerError::from)
                            .and_then(|snapshot| planner.restore(snapshot));
                        match restored {
                            Ok(_) => {
                                println!("Backup loaded from {path}.");
                                println!("{}", render_workouts(planner.workouts()));
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Unsupported format. Use: export csv | save json | load json"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
