//! Info command - shows the configured backend and its user count.

use yagogame::backend::backend_label;

use crate::backend::create_directory;
use crate::cli::InfoArgs;
use crate::output::{OutputFormat, print_fields};

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let directory = create_directory(&args.backend_config).await?;
    let users = directory.count().await?;
    let backend_str = backend_label(directory.store().as_ref());

    match format {
        OutputFormat::Human => {
            print_fields(&[("Backend", backend_str.to_string()), ("Users", users.to_string())]);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "backend": backend_str,
                "users": users,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
