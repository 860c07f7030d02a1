use std::{collections::BTreeSet, io::Write, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use classtable::{
    termination::SignalTerminator, CatalogProvider, Infeasibility, JsonCatalog, Outcome,
    PreferenceGroup, ScheduleSession, SessionState, SolveOptions, TermShape,
};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce conflict-free schedules for the requested courses.
    Solve(SolveArgs),

    /// List the candidate sections of the requested courses.
    Candidates(CandidatesArgs),
}

#[derive(Args)]
struct CatalogArgs {
    /// The JSON file with the catalog sections.
    catalog: PathBuf,

    /// The term to schedule.
    #[arg(short, long)]
    term: String,

    /// A requested course code. Can be repeated.
    #[arg(short, long = "course", required = true)]
    courses: Vec<String>,
}

#[derive(Args)]
struct SolveArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Only allow the given sections of a course, as `COURSE=ID,ID`. Can be repeated.
    #[arg(short, long, value_parser = parse_preference)]
    prefer: Vec<(String, Vec<String>)>,

    /// The file holding the schedules produced earlier. Updated after solving.
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Forget the schedules and preferences in the state file before solving.
    #[arg(long)]
    clear_history: bool,

    /// The number of distinct schedules to produce.
    #[arg(short = 'n', long, default_value_t = 1)]
    solutions: usize,

    /// The week to print for every schedule.
    #[arg(short, long, default_value_t = 1)]
    week: u8,

    /// The number of weeks in the term.
    #[arg(long, default_value_t = TermShape::default().weeks)]
    weeks: u8,

    /// The number of periods in a day.
    #[arg(long, default_value_t = TermShape::default().periods)]
    periods: u8,

    /// The timeout of each solve in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Args)]
struct CandidatesArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
}

fn parse_preference(raw: &str) -> Result<(String, Vec<String>), String> {
    let (course, ids) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COURSE=ID,ID but got '{raw}'"))?;

    let ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();

    if ids.is_empty() {
        return Err(format!("no sections are preferred in '{raw}'"));
    }

    Ok((course.trim().to_owned(), ids))
}

fn main() -> ExitCode {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Solve(args) => solve(args),
        Command::Candidates(args) => list_candidates(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn solve(args: SolveArgs) -> anyhow::Result<()> {
    let catalog = open_catalog(&args.catalog)?;
    let term = args.catalog.term;

    let interrupt = SignalTerminator::register();
    let options = SolveOptions {
        shape: TermShape {
            weeks: args.weeks,
            periods: args.periods,
        },
        timeout: args.timeout.map(Duration::from_secs),
        interrupt: Some(interrupt.flag()),
    };

    let mut session = ScheduleSession::new(&catalog, term.as_str(), options);

    if let Some(path) = args.state.as_ref().filter(|path| path.exists()) {
        let state = SessionState::load(path)
            .with_context(|| format!("failed to load the state in {}", path.display()))?;
        session.restore(state);
    }

    if args.clear_history {
        session.clear_history();
    }

    session.set_requested(args.catalog.courses);

    for (course, preferred) in &args.prefer {
        let all_sections = catalog
            .fetch_candidates(&term, course)
            .into_iter()
            .map(|section| section.id)
            .collect::<Vec<_>>();

        session.set_preference(PreferenceGroup::prefer(
            course.as_str(),
            preferred.iter().map(String::as_str),
            all_sections.iter().map(String::as_str),
        ));
    }

    for n in 1..=args.solutions {
        match session.solve()? {
            Outcome::Scheduled(assignment) => {
                println!("Schedule {n}: {assignment}");

                if let Some(grid) = session.grid() {
                    print!("{}", grid.render_week(args.week));
                }
            }

            Outcome::Infeasible(Infeasibility::Unsatisfiable) => {
                println!("No further schedule exists.");
                break;
            }

            Outcome::Infeasible(Infeasibility::TimedOut) => {
                println!("The solver stopped before finding a schedule.");
                break;
            }
        }
    }

    if let Some(path) = &args.state {
        session
            .state()
            .save(path)
            .with_context(|| format!("failed to save the state to {}", path.display()))?;
    }

    Ok(())
}

fn list_candidates(args: CandidatesArgs) -> anyhow::Result<()> {
    let catalog = open_catalog(&args.catalog)?;

    for course in &args.catalog.courses {
        let sections = catalog.fetch_candidates(&args.catalog.term, course);
        println!("{course}: {} sections", sections.len());

        for section in sections {
            let instructor = section.instructor.as_deref().unwrap_or("-");
            match section.credits {
                Some(credits) => println!(
                    "  {} {} ({instructor}, {credits} credits)",
                    section.id, section.course_name
                ),
                None => println!("  {} {} ({instructor})", section.id, section.course_name),
            }

            match classtable_meeting::parse(&section.weeks, &section.places) {
                Ok(meetings) => {
                    for meeting in meetings {
                        println!(
                            "    weeks {} day {} periods {} at {}",
                            compress(&meeting.weeks),
                            meeting.weekday,
                            compress(&meeting.periods),
                            meeting.room,
                        );
                    }
                }
                Err(e) => println!("    malformed meeting time: {e}"),
            }
        }
    }

    Ok(())
}

fn open_catalog(args: &CatalogArgs) -> anyhow::Result<JsonCatalog> {
    JsonCatalog::open(&args.catalog)
        .with_context(|| format!("failed to read the catalog {}", args.catalog.display()))
}

/// Write a set of numbers as ranges, e.g. `1-3,5`.
fn compress(numbers: &BTreeSet<u8>) -> String {
    let mut ranges: Vec<(u8, u8)> = vec![];

    for &number in numbers {
        match ranges.last_mut() {
            Some((_, end)) if end.checked_add(1) == Some(number) => *end = number,
            _ => ranges.push((number, number)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
