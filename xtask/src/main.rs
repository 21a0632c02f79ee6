use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for neocdrx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, build and test
    Ci {
        /// Stop after fmt and clippy
        #[arg(long)]
        quick: bool,
        /// Print the time taken by each step
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Run tests
    Test {
        /// Run doc tests only
        #[arg(long)]
        doc: bool,
        /// Limit unit tests to these modules
        #[arg(long, value_enum)]
        module: Vec<Module>,
    },
    /// Run the loader benchmarks
    Bench,
    /// Boot a game directory with the command-line loader
    Load {
        /// Directory holding IPL.TXT or a .iso image
        game_dir: String,
        /// Dump memory regions to this directory
        #[arg(short = 'd', long)]
        dump: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Checks run by the git pre-commit hook
    PreCommit,
    /// Install the git pre-commit hook
    InstallHooks,
}

#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Cdrom,
    Storage,
    Memory,
    System,
}

impl Module {
    fn path(self) -> &'static str {
        match self {
            Module::Cdrom => "core::cdrom",
            Module::Storage => "core::storage",
            Module::Memory => "core::memory",
            Module::System => "core::system",
        }
    }
}

type Step = (&'static str, fn() -> Result<()>);

const LINT_STEPS: [Step; 2] = [("Format Check", fmt_check), ("Clippy", clippy_deny)];

const BUILD_STEPS: [Step; 2] = [("Build", build_all), ("Test", test_all)];

fn fmt_check() -> Result<()> {
    run_fmt(true)
}

fn clippy_deny() -> Result<()> {
    run_clippy(false)
}

fn build_all() -> Result<()> {
    execute_command(&mut cargo(&["build", "--all-targets"]))
}

fn test_all() -> Result<()> {
    run_test(false, &[])
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { quick, verbose } => {
            let steps: Vec<Step> = if quick {
                LINT_STEPS.to_vec()
            } else {
                LINT_STEPS.iter().chain(&BUILD_STEPS).copied().collect()
            };
            run_pipeline("CI", &steps, verbose)
        }
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Test { doc, module } => run_test(doc, &module),
        Commands::Bench => execute_command(&mut cargo(&["bench"])),
        Commands::Load {
            game_dir,
            dump,
            release,
        } => run_load(&game_dir, dump.as_deref(), release),
        Commands::PreCommit => {
            let steps = [LINT_STEPS[0], LINT_STEPS[1], BUILD_STEPS[1]];
            run_pipeline("Pre-commit", &steps, false)
        }
        Commands::InstallHooks => install_hooks(),
    }
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn run_pipeline(title: &str, steps: &[Step], verbose: bool) -> Result<()> {
    println!("{}", format!("=== {} ===", title).bold().blue());
    let start = Instant::now();

    for (name, task) in steps {
        print!("{} {} ... ", "→".blue(), name);
        let step_start = Instant::now();
        if let Err(e) = task() {
            println!("{}", "✗".red().bold());
            return Err(e);
        }
        if verbose {
            println!(
                "{} ({:.2}s)",
                "✓".green().bold(),
                step_start.elapsed().as_secs_f64()
            );
        } else {
            println!("{}", "✓".green().bold());
        }
    }

    println!(
        "\n{} {}",
        format!("✓ {} passed in", title).green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = cargo(&["fmt", "--all"]);
    if check {
        cmd.args(["--", "--check"]);
    }
    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo(&["clippy", "--all-targets"]);
    if fix {
        cmd.arg("--fix");
    } else {
        cmd.args(["--", "-D", "warnings"]);
    }
    execute_command(&mut cmd)
}

fn run_test(doc: bool, modules: &[Module]) -> Result<()> {
    if doc {
        return execute_command(&mut cargo(&["test", "--doc"]));
    }
    if modules.is_empty() {
        return execute_command(&mut cargo(&["test"]));
    }

    let mut failed = Vec::new();
    for module in modules {
        println!("{} Testing {}", "→".blue(), module.path().bold());
        if execute_command(&mut cargo(&["test", "--lib", module.path()])).is_err() {
            failed.push(module.path());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Tests failed in: {}", failed.join(", "));
    }
    Ok(())
}

fn run_load(game_dir: &str, dump: Option<&str>, release: bool) -> Result<()> {
    if !Path::new(game_dir).is_dir() {
        println!(
            "{} Game directory not found: {}",
            "✗".red().bold(),
            game_dir.yellow()
        );
        anyhow::bail!("Game directory not found");
    }

    let mut cmd = cargo(&["run", "--bin", "neocdrx"]);
    if release {
        cmd.arg("--release");
    }
    cmd.args(["--", game_dir]);
    if let Some(dump) = dump {
        cmd.args(["--dump", dump]);
    }

    println!("{} Booting {}", "→".blue(), game_dir.cyan());
    execute_command(&mut cmd)
}

fn install_hooks() -> Result<()> {
    use std::fs;

    let hook_path = Path::new(".git/hooks/pre-commit");
    fs::write(hook_path, "#!/bin/sh\nset -e\ncargo x pre-commit\n")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{} Installed {}", "✓".green(), hook_path.display());
    Ok(())
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
