//! Split command - run the engine with CLI collaborators wired in

use crate::cli::style::{check, cross, Stylize};
use crate::Cli;
use anstream::{eprintln, println};
use anyhow::Context;
use cl_split::error::{Error, Result};
use cl_split::git::GitWorkspace;
use cl_split::owners::GerritOwnersService;
use cl_split::split::{
    format_directories, split_branch, ChangePreview, GitClUploader, SplitOptions, SplitOutcome,
    SplitProgress,
};
use dialoguer::Confirm;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Progress callbacks that print styled output and prompt on the terminal.
struct CliProgress;

impl SplitProgress for CliProgress {
    fn on_message(&self, message: &str) {
        println!("{message}");
    }

    fn on_preview(&self, preview: &ChangePreview<'_>) {
        println!(
            "{}",
            format!("Change {}/{}", preview.index, preview.total).emphasis()
        );
        println!("Paths: {}", format_directories(preview.directories).accent());
        println!("Reviewers: {}", preview.reviewers.to_string().accent());
        println!("Auto-Submit: {}", preview.enable_auto_submit);
        println!("CQ Dry Run: {}", preview.cq_dry_run);
        println!("Topic: {}", preview.topic.unwrap_or(""));
        println!();
        for line in preview.description.lines() {
            println!("    {line}");
        }
        println!();
        for file in &preview.files {
            println!("{file}");
        }
        println!();
    }

    fn on_upload_failed(&self, branch: &str) {
        eprintln!("{} Uploading failed.", cross());
        eprintln!("{}", "Note: cl-split can resume an interrupted run.".muted().for_stderr());
        eprintln!(
            "Delete {} then run cl-split again to resume uploading.",
            branch.accent().for_stderr()
        );
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|err| Error::Io(std::io::Error::other(err)))
    }
}

/// Run the split command; the returned code is the process exit code.
pub fn run_split(cli: &Cli) -> ExitCode {
    match try_run(cli) {
        Ok(SplitOutcome::Completed) => {
            if !cli.dry_run {
                println!("{} split complete", check());
            }
            ExitCode::SUCCESS
        }
        // A decline is a deliberate no-op, not a failure.
        Ok(SplitOutcome::Declined) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: &Cli) -> anyhow::Result<SplitOutcome> {
    let description = fs::read_to_string(&cli.description).with_context(|| {
        format!(
            "failed to read description file {}",
            cli.description.display()
        )
    })?;
    let comment = match &cli.comment {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read comment file {}", path.display()))?,
        ),
        None => None,
    };

    let path = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let workspace = GitWorkspace::discover(&path)?;

    let origin = workspace
        .config("remote.origin.url")?
        .context("repository has no origin remote")?;
    let owners = GerritOwnersService::from_remote(
        &origin,
        cli.host.as_deref(),
        destination_branch(&workspace)?,
    )?;
    let uploader = GitClUploader::new(&workspace);

    let options = SplitOptions {
        description,
        comment,
        dry_run: cli.dry_run,
        cq_dry_run: cli.cq_dry_run,
        enable_auto_submit: cli.enable_auto_submit,
        max_depth: cli.max_depth,
        topic: cli.topic.clone(),
    };

    Ok(split_branch(
        &workspace,
        &owners,
        &uploader,
        &CliProgress,
        &options,
    )?)
}

/// Branch whose OWNERS state the server is asked about: the upstream with
/// any remote prefix dropped. The engine re-checks the upstream itself;
/// this fallback only feeds the owners lookup.
fn destination_branch(workspace: &GitWorkspace) -> Result<String> {
    let Some(branch) = workspace.current_branch()? else {
        return Ok("main".to_string());
    };
    let Some(upstream) = workspace.upstream(&branch)? else {
        return Ok("main".to_string());
    };
    Ok(upstream
        .split_once('/')
        .map_or_else(|| upstream.clone(), |(_, rest)| rest.to_string()))
}

fn report_error(err: &anyhow::Error) {
    // A process failure already captured the child's stderr; surface it
    // verbatim after the summary line.
    if let Some(Error::Process(failure)) = err.downcast_ref::<Error>() {
        eprintln!("{}: {failure}", "error".error());
        if !failure.stderr.is_empty() {
            anstream::eprint!("{}", failure.stderr);
        }
    } else {
        eprintln!("{}: {err:#}", "error".error());
    }
}
