use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mystic_sort::boot::{self, BootStatus};
use mystic_sort::host::{HostPage, LogEntry, RecordingNavigator, StaticAccount};
use mystic_sort::loader::load_entries;
use mystic_sort::{MSError, Session, SortConfig, SortKey};

/// Replays sort clicks against a simulated scouts' log panel.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scouts' log export (csv, parquet or arrow)
    path: String,

    /// Username of the signed in scout
    #[arg(short, long, default_value = "")]
    user: String,

    /// Capabilities the scout holds
    #[arg(long = "grant", value_name = "CAPABILITY", default_value = "mystic admin")]
    grants: Vec<String>,

    /// Sort controls to click, in order (name, id, status, player-a, player-b, time)
    #[arg(short, long = "sort", value_name = "KEY")]
    sorts: Vec<SortKey>,

    /// Close and reopen the panel after the clicks
    #[arg(long)]
    reopen: bool,

    /// Click the jump control of this cell at the end
    #[arg(long, value_name = "ID")]
    jump: Option<String>,

    /// Boot poll attempts before giving up
    #[arg(long, default_value_t = 50)]
    max_polls: usize,
}

fn main() -> ExitCode {
    init_logging();
    match run(Args::parse()) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();
}

fn run(args: Args) -> Result<(), MSError> {
    let path = shellexpand::full(&args.path)
        .map_err(|e| MSError::LoadingFailed(e.to_string()))?;
    let entries = load_entries(&PathBuf::from(path.into_owned()))?;

    let config = SortConfig::default();
    let mut host = HostPage::new(&config);
    let account = StaticAccount {
        uid: Some(1),
        username: args.user.clone(),
        capabilities: args.grants.clone(),
    };

    // The host only renders its panel some time after the page loads.
    let mut polls = 0;
    let status = boot::wait_for_activation(&config, args.max_polls, || {
        polls += 1;
        if polls == 2 {
            host.install_panel();
        }
        boot::check(Some(&account), &host.doc, &config)
    });
    if status != BootStatus::Ready {
        println!("Sorting not activated ({status:?})");
        return Ok(());
    }

    let mut session = Session::start(&mut host.doc, &account, &config)?;
    let mut navigator = RecordingNavigator::default();

    open_panel(&mut host, &mut session, &entries);
    print_table("Opened", &host, &session);

    for key in args.sorts {
        if session.activate(&mut host.doc, key, &mut navigator).is_none() {
            info!("No control for {key}");
        }
        print_table(&format!("Clicked {key}"), &host, &session);
    }

    if args.reopen {
        host.close_panel();
        open_panel(&mut host, &mut session, &entries);
        print_table("Reopened", &host, &session);
    }

    if let Some(id) = args.jump {
        let Some(control) = host.jump_control(&id) else {
            return Err(MSError::missing(format!("jump control for cell {id}")));
        };
        session.click(&mut host.doc, control, &mut navigator);
        println!("Navigation: closed {}x, jumps {:?}", navigator.closed, navigator.jumps);
    }
    Ok(())
}

fn open_panel(host: &mut HostPage, session: &mut Session, entries: &[LogEntry]) {
    host.open_tab();
    session.pump(&mut host.doc);
    host.populate(entries);
    session.pump(&mut host.doc);
}

fn print_table(title: &str, host: &HostPage, session: &Session) {
    let state = session.state();
    println!(
        "== {title}: sorted by {} ({})",
        state.key,
        state.direction.as_attr()
    );
    println!("{}\n", host.render_text());
}
