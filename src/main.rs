// Dev utility for the employee directory database.
//
// Usage:
//   employee-directory init [db_path]
//   employee-directory import <file.csv|file.json> [user_id] [db_path]
//
// db_path defaults to EMPLOYEE_DIRECTORY_DB_PATH or the per-user data directory.

use employee_directory::app::{get_default_db_path, AppState};
use employee_directory::domain::CallerIdentity;
use employee_directory::logging;

fn usage() -> String {
    "usage: employee-directory init [db_path] | import <file> [user_id] [db_path]".to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().ok_or_else(usage)?;

    match command.as_str() {
        "init" => {
            let db_path = args.next().unwrap_or_else(get_default_db_path);
            let state = AppState::new(db_path)?;
            let locations = state.location_repo.list_all()?;
            println!("db_path={}", state.db_path);
            for location in locations {
                println!("location id={} {}", location.id, location.full());
            }
        }
        "import" => {
            let file_path = args.next().ok_or_else(usage)?;
            let caller = match args.next().map(|s| s.trim().to_string()) {
                Some(raw) if !raw.is_empty() && raw != "-" => CallerIdentity::User {
                    user_id: raw.parse()?,
                },
                _ => CallerIdentity::Anonymous,
            };
            let db_path = args.next().unwrap_or_else(get_default_db_path);

            let state = AppState::new(db_path)?;
            let result = state
                .employee_api
                .import_employees_file(file_path, caller)
                .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        _ => return Err(usage().into()),
    }

    Ok(())
}
