use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use h2p_lib::{H2pError, ResponseEnvelope};

/// Write the JSON envelope to a file or stdout.
pub fn write_envelope(envelope: &ResponseEnvelope, output: Option<&Path>) -> Result<(), H2pError> {
    let content = serde_json::to_string(envelope)?;
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{content}"),
    }
    Ok(())
}

/// Write raw bytes to a file or stdout.
pub fn write_bytes(bytes: &[u8], output: Option<&Path>) -> Result<(), H2pError> {
    match output {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Render an error as a JSON payload on stdout and return the error exit code.
pub fn render_error(err: H2pError) -> ExitCode {
    let payload = err.to_payload();
    let content = serde_json::to_string(&payload)
        .unwrap_or_else(|_| format!("{{\"message\":{:?}}}", payload.message));
    println!("{content}");

    // Exit code 2 for fatal errors; 1 is a non-2xx envelope.
    ExitCode::from(2)
}
