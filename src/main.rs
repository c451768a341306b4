use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match rowmerge_lib::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Run failed");
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
