//! External renderer invocation.
//!
//! Rendering is a blocking pipe: the graph text is written to the child's
//! standard input on a helper thread while standard output and standard
//! error are collected, so large graphs cannot deadlock on full pipes. Any
//! spawn failure, broken pipe, non-zero exit or empty output is an error;
//! partial output is never returned.
//!
//! No timeout is applied here. Callers that need one should wrap the call.

use crate::error::{Error, Result};
use crate::graph::Graph;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Ghostscript arguments that turn PostScript on stdin into a PNG on stdout.
const GHOSTSCRIPT_PNG_ARGS: &[&str] = &[
    "-q",
    "-dTextAlphaBits=4",
    "-dGraphicsAlphaBits=4",
    "-sDEVICE=png16m",
    "-sOutputFile=%stdout%",
    "-",
];

impl Graph {
    /// Render the graph with an external Graphviz-compatible binary.
    ///
    /// Runs `<renderer_path> -T<format>` with the canonical text on standard
    /// input and returns whatever the renderer wrote to standard output.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the renderer binary does not exist
    /// - `Error::Spawn` / `Error::Io` on process or pipe failures
    /// - `Error::Failed` if the renderer exits unsuccessfully
    /// - `Error::EmptyOutput` if it succeeds without producing bytes
    pub fn render_image(&self, renderer_path: impl AsRef<OsStr>, format: &str) -> Result<Vec<u8>> {
        let text = self.render_text();
        debug!(
            graph = %self.name(),
            format,
            bytes = text.len(),
            "Rendering graph"
        );
        pipe_through(renderer_path, &[format!("-T{format}")], text.as_bytes())
    }
}

/// Convert PostScript into a PNG image by piping it through ghostscript.
///
/// # Errors
///
/// Same failure modes as [`pipe_through`].
pub fn rasterize_postscript(gs_path: impl AsRef<OsStr>, postscript: &[u8]) -> Result<Vec<u8>> {
    pipe_through(gs_path, GHOSTSCRIPT_PNG_ARGS, postscript)
}

/// Run `command args...`, feed it `input`, and return its standard output.
///
/// # Errors
///
/// - `Error::NotFound` if the executable does not exist
/// - `Error::Spawn` if it cannot be started for another reason
/// - `Error::Failed` if it exits unsuccessfully (stderr is included)
/// - `Error::Io` if writing the input fails, including a broken pipe
/// - `Error::EmptyOutput` if it succeeds but writes nothing
pub fn pipe_through<S>(command: impl AsRef<OsStr>, args: &[S], input: &[u8]) -> Result<Vec<u8>>
where
    S: AsRef<OsStr>,
{
    let command = command.as_ref();
    let name = command.to_string_lossy().into_owned();

    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound {
                    command: name.clone(),
                }
            } else {
                Error::Spawn {
                    command: name.clone(),
                    source: e,
                }
            }
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "renderer stdin unavailable"))?;
    let input = input.to_vec();
    let writer = thread::spawn(move || -> io::Result<()> {
        stdin.write_all(&input)?;
        stdin.flush()
        // stdin dropped here, closing the pipe
    });

    let output = child.wait_with_output()?;
    let written = writer
        .join()
        .map_err(|_| io::Error::other("renderer input thread panicked"))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        debug!(command = %name, stderr = %stderr, "Renderer wrote to stderr");
    }

    if !output.status.success() {
        return Err(Error::Failed {
            command: name,
            status: output.status,
            stderr,
        });
    }
    written?;
    if output.stdout.is_empty() {
        return Err(Error::EmptyOutput { command: name });
    }

    debug!(command = %name, bytes = output.stdout.len(), "Renderer finished");
    Ok(output.stdout)
}
