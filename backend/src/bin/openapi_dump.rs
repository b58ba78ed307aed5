//! Print the OpenAPI document as JSON.

use grocer::ApiDoc;
use utoipa::OpenApi;

fn main() -> std::process::ExitCode {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => {
            println!("{json}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to serialise OpenAPI document: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
