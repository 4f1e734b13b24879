//! Child-process plumbing shared by the etcd and kube-apiserver launchers.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Spawn `binary` with `args`, forwarding its output to `tracing`.
///
/// The child is killed if its handle is dropped.
pub(crate) fn spawn(component: &'static str, binary: &Path, args: &[String]) -> Result<Child> {
    if !binary.is_file() {
        return Err(Error::config(format!(
            "{component} binary not found at {}",
            binary.display()
        )));
    }

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(stdout) = child.stdout.take() {
        forward_output(component, stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_output(component, stderr);
    }

    info!(component, pid = ?child.id(), binary = %binary.display(), "process started");
    Ok(child)
}

/// Fail if something already listens on `addr`.
///
/// The listener ports are fixed, so a process left over from an earlier run
/// would otherwise answer the readiness probes in place of the new child.
pub(crate) fn ensure_port_free(component: &'static str, addr: SocketAddr) -> Result<()> {
    match TcpListener::bind(addr) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => Err(Error::config(format!(
            "{component} cannot listen on {addr}: address already in use"
        ))),
        // Anything else (e.g. a privileged port) is left for the child to report.
        Err(_) => Ok(()),
    }
}

fn forward_output<R>(component: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(component, "{line}");
        }
    });
}
