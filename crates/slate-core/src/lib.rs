pub mod cli;
pub mod config;
pub mod datastore;
pub mod intent;
pub mod render;
pub mod state;
pub mod task;
pub mod theme;
pub mod view;

use std::ffi::OsString;
use std::io::{self, BufRead, Write};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};

use crate::intent::{Intent, Outcome};
use crate::state::Session;
use crate::view::ViewModel;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let cli = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting slate");
    debug!(?pre.rc_overrides, "preprocessed rc overrides");

    let mut cfg = config::Config::load(cli.slaterc.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .into_iter()
            .chain(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value))),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let store = datastore::DataStore::open(&data_dir)
        .with_context(|| format!("failed to open datastore at {}", data_dir.display()))?;

    let mut session = Session::new(store.load_tasks());
    let mut theme = store.load_theme();
    let mut renderer = render::Renderer::new(&cfg)?;

    renderer.print_view(&current_view(&session), theme)?;

    let stdin = io::stdin();
    loop {
        print_prompt(&session)?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            debug!("stdin closed");
            break;
        }

        let intent = if session.editing() {
            // the edit field owns the line; Enter commits its trimmed value
            Intent::SaveEdit(line.trim().to_string())
        } else {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match intent::parse_line(line) {
                Some(intent) => intent,
                None => {
                    println!("Unrecognized input; type 'help' for the list of commands.");
                    continue;
                }
            }
        };

        match intent::apply(intent, &mut session, &mut theme, &store, Utc::now())? {
            Outcome::Quit => break,
            Outcome::Help => renderer.print_help()?,
            Outcome::Continue => {}
        }

        renderer.print_view(&current_view(&session), theme)?;
    }

    info!("done");
    Ok(())
}

fn current_view(session: &Session) -> ViewModel {
    view::view(
        session.tasks(),
        session.filter(),
        session.editing_id(),
        session.input_error(),
    )
}

fn print_prompt(session: &Session) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if let Some(id) = session.editing_id() {
        let field = session
            .tasks()
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.title.as_str())
            .unwrap_or_default();
        write!(out, "edit [{field}]> ")?;
    } else {
        write!(out, "> ")?;
    }
    out.flush()?;
    Ok(())
}
