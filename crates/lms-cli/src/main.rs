mod cmd;

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lms-fix",
    about = "Data-fixing tools for an LMS REST API: restore enrollments, back up users, rename courses",
    long_about = "Data-fixing tools for an LMS REST API.\n\n\
                  Connection settings come from the environment: API_BASE_URL and API_KEY \
                  (CANVAS_API_URL / CANVAS_API_KEY are accepted as fallbacks).",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore deleted enrollments for the users listed in a CSV file
    RestoreEnrollments {
        /// CSV file with a `user_id` column of SIS user ids
        csv_file: PathBuf,

        /// Comma-separated list of sections (SIS or numeric id) to leave alone
        #[arg(long)]
        skip_sections: Option<String>,

        /// Only restore enrollments updated at or after this time
        /// (e.g. 2024-08-21T00:00:00-05:00 or 2024-08-21)
        #[arg(long)]
        after_date: Option<String>,

        /// Decide and log, but do not re-enroll anyone
        #[arg(long)]
        dry_run: bool,
    },

    /// Re-enroll deleted users from an exported enrollments CSV
    Enroll {
        /// CSV file with `user_id` and `status` columns; rows with status `deleted` are used
        users_to_process: PathBuf,

        /// CSV file with `user_id`, `canvas_section_id`, `canvas_user_id`, `base_role_type`
        enrollments: PathBuf,

        /// Log the enrollments that would be created; credentials are not required
        #[arg(long)]
        dry_run: bool,
    },

    /// Back up communication channels and group memberships of users to JSON
    BackupUsers {
        /// CSV file with a `user_id` column of SIS user ids
        csv_file: PathBuf,

        /// Output JSON file
        output_file: PathBuf,
    },

    /// Replace a substring in course names, course codes and section names
    RenameCourses {
        /// JSON array of courses (`id`, `name`, `course_code`), e.g. from
        /// /api/v1/accounts/:id/courses
        json_file: PathBuf,

        /// Text to replace
        #[arg(long)]
        from: String,

        /// Replacement text
        #[arg(long)]
        to: String,

        /// Log the renames without sending updates
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let result = match cli.command {
        Commands::RestoreEnrollments {
            csv_file,
            skip_sections,
            after_date,
            dry_run,
        } => cmd::restore::run(
            &csv_file,
            skip_sections.as_deref(),
            after_date.as_deref(),
            dry_run,
        ),
        Commands::Enroll {
            users_to_process,
            enrollments,
            dry_run,
        } => cmd::enroll::run(&users_to_process, &enrollments, dry_run),
        Commands::BackupUsers {
            csv_file,
            output_file,
        } => cmd::backup::run(&csv_file, &output_file),
        Commands::RenameCourses {
            json_file,
            from,
            to,
            dry_run,
        } => cmd::rename::run(&json_file, from, to, dry_run),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
