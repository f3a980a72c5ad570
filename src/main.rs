mod address;
mod cli;
mod completions;
mod config;
mod context;
mod error;
mod git;
mod merge;
mod perms;
mod remote;
mod report;
mod session;
mod shop;
mod status;
mod sweatfile;
mod tap;
#[cfg(test)]
mod testutil;
mod vcs;
mod workspace;

use anyhow::Result;
use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;
use context::Context;
use perms::{ReviewAction, ReviewDecision};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

fn decisions(global: Vec<String>, repo: Vec<String>, discard: Vec<String>) -> Vec<ReviewDecision> {
    let tagged = |rules: Vec<String>, action: ReviewAction| {
        rules
            .into_iter()
            .map(move |rule| ReviewDecision { rule, action })
    };
    tagged(global, ReviewAction::PromoteGlobal)
        .chain(tagged(repo, ReviewAction::PromoteRepo))
        .chain(tagged(discard, ReviewAction::Discard))
        .collect()
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let ctx = Context {
        config: &config,
        vcs: &git::GitCli,
        session: &session::Zmx,
        remote: &remote::Ssh,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Open {
            target,
            format,
            no_attach,
            agent_args,
        } => {
            let target = address::parse_target(&target);
            if let Some(host) = &target.host {
                return Ok(remote::open_remote(ctx.remote, host, &target.path)?);
            }
            let ws_path = address::worktree_path(&config.home, &target.path);
            if ws_path.is_dir() {
                shop::open_existing(&ctx, &target.path, format, no_attach, &agent_args, &mut stdout)?;
            } else {
                shop::open_new(&ctx, &target.path, format, no_attach, &agent_args, &mut stdout)?;
            }
        }
        Commands::Close { path, format } => shop::close(&ctx, &path, format, &mut stdout)?,
        Commands::Merge => {
            let cwd = std::env::current_dir()?;
            merge::run(&ctx, &cwd)?;
        }
        Commands::Status { local } => {
            write!(stdout, "{}", status::render(&report::local_rows(&ctx)))?;
            if !local {
                for (host, report) in report::remote_reports(&ctx) {
                    writeln!(stdout)?;
                    let heading = format!("{host}:");
                    writeln!(
                        stdout,
                        "{}",
                        heading.if_supports_color(Stream::Stdout, |t| t.bold())
                    )?;
                    write!(stdout, "{report}")?;
                }
            }
        }
        Commands::Completions => completions::all(&ctx, &mut stdout)?,
        Commands::Perms {
            path,
            global,
            repo,
            discard,
        } => perms::review_workspace(
            &config.tiers_dir(),
            &config.home,
            &path,
            &decisions(global, repo, discard),
        )?,
        Commands::Version => {
            writeln!(
                stdout,
                "{} {}",
                "sweatshop".if_supports_color(Stream::Stdout, |t| t.cyan()),
                env!("CARGO_PKG_VERSION")
            )?;
        }
    }
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!(
            "{} {:#}",
            "error:".if_supports_color(Stream::Stderr, |t| t.red()),
            err
        );
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_are_tagged_in_flag_order() {
        let got = decisions(
            vec!["Read".to_string()],
            vec!["Bash(just:*)".to_string()],
            vec!["WebFetch".to_string()],
        );
        let actions: Vec<ReviewAction> = got.iter().map(|d| d.action).collect();
        assert_eq!(
            actions,
            vec![
                ReviewAction::PromoteGlobal,
                ReviewAction::PromoteRepo,
                ReviewAction::Discard
            ]
        );
        assert_eq!(got[1].rule, "Bash(just:*)");
    }
}
