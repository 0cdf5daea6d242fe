//! Debug adapter: streams change notifications to an external visualizer.
//!
//! This is glue around the core's notification hook, not part of the
//! engine: a thin client that serializes every [`StateChange`] as one JSON
//! line over a persistent TCP connection. The engine never depends on the
//! visualizer being reachable - adapter failures are logged and dispatch
//! continues.

mod config;

pub use config::{Config, ConfigError, ENV_HOST, ENV_PORT};

use crate::observe::{StateChange, StateObserver};
use std::io::Write;
use std::net::TcpStream;
use std::sync::Mutex;
use tracing::{info, warn};

/// Streams change notifications to a remote visualizer as newline-delimited
/// JSON.
///
/// The first write failure disables the client for the rest of its
/// lifetime; the owning machine keeps dispatching regardless.
///
/// # Example
///
/// ```rust,no_run
/// use statecraft::adapter::{Config, DebugClient};
/// use statecraft::builder::ChartBuilder;
/// use statecraft::machine::Machine;
/// use std::sync::Arc;
///
/// let config = Config::load(None)?;
/// let client = Arc::new(DebugClient::connect(&config)?);
///
/// let chart = ChartBuilder::new("Door")
///     .state("Closed", |s| s.on("Open", "Opened"))
///     .state("Opened", |s| s.on("Close", "Closed"))
///     .initial("Closed")
///     .build()?;
/// let machine = Machine::with_observers(chart, vec![client]);
/// # let _ = machine;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DebugClient {
    endpoint: String,
    stream: Mutex<Option<TcpStream>>,
}

impl DebugClient {
    /// Open the persistent connection described by `config`.
    pub fn connect(config: &Config) -> std::io::Result<Self> {
        let endpoint = format!("{}:{}", config.host, config.port);
        let stream = TcpStream::connect(&endpoint)?;
        stream.set_nodelay(true)?;
        info!(%endpoint, "debug adapter connected");
        Ok(DebugClient {
            endpoint,
            stream: Mutex::new(Some(stream)),
        })
    }

    /// Whether the connection is still usable.
    pub fn is_connected(&self) -> bool {
        self.stream.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl StateObserver for DebugClient {
    fn state_changed(&self, change: &StateChange) {
        let Ok(mut slot) = self.stream.lock() else {
            return;
        };
        let Some(stream) = slot.as_mut() else {
            return;
        };
        let mut line = match serde_json::to_vec(change) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to serialize state change");
                return;
            }
        };
        line.push(b'\n');
        if let Err(err) = stream.write_all(&line) {
            warn!(endpoint = %self.endpoint, error = %err, "debug adapter disconnected");
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::state_id;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    fn local_config(port: u16) -> Config {
        Config {
            host: "127.0.0.1".to_owned(),
            port,
        }
    }

    #[test]
    fn client_streams_changes_as_json_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut lines = BufReader::new(stream).lines();
            lines.next().unwrap().unwrap()
        });

        let client = DebugClient::connect(&local_config(port)).unwrap();
        client.state_changed(&StateChange::new("Door", "Closed", "Opened"));

        let line = server.join().unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["machineName"], "Door");
        assert_eq!(json["oldStateName"], "Closed");
        assert_eq!(json["newStateName"], "Opened");
        assert_eq!(json["newStateId"], state_id("Door", "Opened"));
    }

    #[test]
    fn connect_fails_when_nobody_listens() {
        // bind then drop to get a port that is very likely closed
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        assert!(DebugClient::connect(&local_config(port)).is_err());
    }

    #[test]
    fn write_failure_disables_the_client() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = DebugClient::connect(&local_config(port)).unwrap();
        assert!(client.is_connected());

        // accept then drop the server side of the connection
        drop(listener.accept().unwrap());
        drop(listener);

        let change = StateChange::new("Door", "Closed", "Opened");
        // the first write may still land in OS buffers; retry until the
        // broken pipe surfaces
        for _ in 0..100 {
            if !client.is_connected() {
                break;
            }
            client.state_changed(&change);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(!client.is_connected());
    }
}
